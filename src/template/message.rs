use std::fmt;

/// Wire type of a message variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    U8,
    U16,
    U32,
    U64,
    S8,
    S16,
    S32,
    S64,
    F32,
    F64,
    Vector3,
    Vector3d,
    Vector4,
    Quaternion,
    Uuid,
    Bool,
    IpAddr,
    IpPort,
    /// Raw bytes of the given length
    Fixed(u32),
    /// Bytes preceded by a length field of the given width
    Variable(u32),
}

impl VariableType {
    /// The fixed width type named `keyword`
    pub fn scalar(keyword: &str) -> Option<VariableType> {
        use self::VariableType::*;
        let typ = match keyword {
            "U8" => U8,
            "U16" => U16,
            "U32" => U32,
            "U64" => U64,
            "S8" => S8,
            "S16" => S16,
            "S32" => S32,
            "S64" => S64,
            "F32" => F32,
            "F64" => F64,
            "LLVector3" => Vector3,
            "LLVector3d" => Vector3d,
            "LLVector4" => Vector4,
            "LLQuaternion" => Quaternion,
            "LLUUID" => Uuid,
            "BOOL" => Bool,
            "IPADDR" => IpAddr,
            "IPPORT" => IpPort,
            _ => return None,
        };
        Some(typ)
    }

    /// Bytes on the wire; the length field width for `Variable`
    pub fn size(&self) -> u32 {
        use self::VariableType::*;
        match *self {
            U8 | S8 | Bool => 1,
            U16 | S16 | IpPort => 2,
            U32 | S32 | F32 | IpAddr => 4,
            U64 | S64 | F64 => 8,
            Vector3 | Quaternion => 12,
            Vector4 | Uuid => 16,
            Vector3d => 24,
            Fixed(size) | Variable(size) => size,
        }
    }

    /// `Fixed` and `Variable` make the enclosing block variable length
    pub fn is_variable_length(&self) -> bool {
        match *self {
            VariableType::Fixed(_) | VariableType::Variable(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::VariableType::*;
        match *self {
            Vector3 => f.write_str("LLVector3"),
            Vector3d => f.write_str("LLVector3d"),
            Vector4 => f.write_str("LLVector4"),
            Quaternion => f.write_str("LLQuaternion"),
            Uuid => f.write_str("LLUUID"),
            Bool => f.write_str("BOOL"),
            IpAddr => f.write_str("IPADDR"),
            IpPort => f.write_str("IPPORT"),
            Fixed(size) => write!(f, "Fixed {}", size),
            Variable(size) => write!(f, "Variable {}", size),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageVariable {
    name: String,
    typ: VariableType,
}

impl MessageVariable {
    pub fn new<S: Into<String>>(name: S, typ: VariableType) -> MessageVariable {
        MessageVariable {
            name: name.into(),
            typ,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable_type(&self) -> VariableType {
        self.typ
    }

    pub fn size(&self) -> u32 {
        self.typ.size()
    }
}

/// How many times a block repeats in a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Single,
    Multiple(u32),
    /// Count carried in the message itself
    Variable,
}

impl BlockType {
    /// Repetitions, None when decided per message
    pub fn count(&self) -> Option<u32> {
        match *self {
            BlockType::Single => Some(1),
            BlockType::Multiple(count) => Some(count),
            BlockType::Variable => None,
        }
    }
}

/// Ordered variables of one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    name: String,
    block_type: BlockType,
    variables: Vec<MessageVariable>,
    total_size: Option<u32>,
}

impl MessageBlock {
    pub fn new<S: Into<String>>(name: S, block_type: BlockType) -> MessageBlock {
        let total_size = match block_type {
            BlockType::Variable => None,
            _ => Some(0),
        };
        MessageBlock {
            name: name.into(),
            block_type,
            variables: Vec::new(),
            total_size,
        }
    }

    /// Appends `variable`; the caller keeps names unique
    pub fn add_variable(&mut self, variable: MessageVariable) {
        self.total_size = match self.total_size {
            Some(_) if variable.variable_type().is_variable_length() => None,
            Some(size) => Some(size + variable.size()),
            None => None,
        };
        self.variables.push(variable);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    /// Variables in wire order
    pub fn variables(&self) -> &[MessageVariable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&MessageVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Bytes of one instance of the block, None when variable length
    pub fn total_size(&self) -> Option<u32> {
        self.total_size
    }
}

/// How often a message is sent, which decides the width of its id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    High,
    Medium,
    Low,
}

impl Frequency {
    /// Id of message `number` in this frequency class
    pub fn message_id(self, number: u32) -> u32 {
        match self {
            Frequency::High => number,
            Frequency::Medium => 0xFF << 8 | number,
            Frequency::Low => 0xFF << 24 | 0xFF << 16 | number,
        }
    }

    /// Largest message number the class can hold
    pub fn max_number(self) -> u32 {
        match self {
            Frequency::High | Frequency::Medium => 0xFF,
            Frequency::Low => 0xFFFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    Trusted,
    NotTrusted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Unencoded,
    Zerocoded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deprecation {
    NotDeprecated,
    /// Retired everywhere
    Deprecated,
    /// Still accepted over UDP, with a warning
    UdpDeprecated,
    /// Never accepted over UDP
    UdpBlackListed,
}

/// Layout of one protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    name: String,
    frequency: Frequency,
    number: u32,
    id: u32,
    trust: Trust,
    encoding: Encoding,
    deprecation: Deprecation,
    blocks: Vec<MessageBlock>,
}

impl MessageTemplate {
    pub fn new<S: Into<String>>(
        name: S,
        frequency: Frequency,
        number: u32,
        trust: Trust,
        encoding: Encoding,
        deprecation: Deprecation,
    ) -> MessageTemplate {
        MessageTemplate {
            name: name.into(),
            frequency,
            number,
            id: frequency.message_id(number),
            trust,
            encoding,
            deprecation,
            blocks: Vec::new(),
        }
    }

    /// Appends `block`; the caller keeps names unique
    pub fn add_block(&mut self, block: MessageBlock) {
        self.blocks.push(block);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Number within the frequency class
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Number packed with the frequency class
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn trust(&self) -> Trust {
        self.trust
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn deprecation(&self) -> Deprecation {
        self.deprecation
    }

    pub fn is_udp_banned(&self) -> bool {
        self.deprecation == Deprecation::UdpBlackListed
    }

    pub fn is_udp_deprecated(&self) -> bool {
        self.deprecation == Deprecation::UdpDeprecated
    }

    /// Blocks in wire order
    pub fn blocks(&self) -> &[MessageBlock] {
        &self.blocks
    }

    pub fn block(&self, name: &str) -> Option<&MessageBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }
}
