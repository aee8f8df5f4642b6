use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};

use super::check::{positive_integer_ok, variable_ok};
use super::error::{fatal, TemplateError};
use super::message::{
    BlockType, Deprecation, Encoding, Frequency, MessageBlock, MessageTemplate, MessageVariable,
    Trust, VariableType,
};
use super::tokenizer::TemplateTokenizer;

/// Every message of a template file, except the retired ones
///
/// ```text
/// version 2.0
/// {
///     TestMsg Low 1 NotTrusted Zerocoded
///     {
///         Block1 Single
///         { Val U32 }
///     }
/// }
/// ```
///
/// All parse failures are fatal, see the [module docs](super).
#[derive(Debug, Clone)]
pub struct TemplateParser {
    version: f32,
    messages: Vec<MessageTemplate>,
}

fn expected(tokens: &TemplateTokenizer, expected: &'static str, found: String) -> ! {
    fatal(TemplateError::Expected {
        line: tokens.line(),
        expected,
        found,
    })
}

fn invalid(tokens: &TemplateTokenizer, what: &'static str, token: &str) -> ! {
    fatal(TemplateError::Invalid {
        line: tokens.line(),
        what,
        token: token.to_owned(),
    })
}

fn duplicate(tokens: &TemplateTokenizer, what: &'static str, name: &str) -> ! {
    fatal(TemplateError::Duplicate {
        line: tokens.line(),
        what,
        name: name.to_owned(),
    })
}

fn want_close(tokens: &mut TemplateTokenizer) {
    if !tokens.want("}") {
        let found = tokens.next();
        expected(tokens, "'}'", found);
    }
}

fn name(tokens: &mut TemplateTokenizer, what: &'static str) -> String {
    let name = tokens.next();
    if !variable_ok(&name) {
        invalid(tokens, what, &name);
    }
    name
}

fn positive_integer(tokens: &mut TemplateTokenizer, what: &'static str) -> u32 {
    let token = tokens.next();
    match token.parse::<u32>() {
        Ok(value) if value > 0 && positive_integer_ok(&token) => value,
        _ => invalid(tokens, what, &token),
    }
}

fn message_number(token: &str) -> Option<u32> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return u32::from_str_radix(hex, 16).ok();
    }
    if !positive_integer_ok(token) {
        return None;
    }
    token.parse().ok()
}

impl TemplateParser {
    /// Parses the whole token stream
    ///
    /// # Panics
    ///
    /// * The template is malformed in any way.
    pub fn new(tokens: &mut TemplateTokenizer) -> TemplateParser {
        if !tokens.want("version") {
            let found = tokens.next();
            expected(tokens, "'version'", found);
        }
        let token = tokens.next();
        let version = match token.parse::<f32>() {
            Ok(version) => version,
            Err(_) => invalid(tokens, "version", &token),
        };
        info!("### Message template version {} ###", version);

        let mut messages = Vec::new();
        while let Some(template) = TemplateParser::parse_message(tokens) {
            if template.deprecation() == Deprecation::Deprecated {
                debug!("dropping deprecated message {}", template.name());
                continue;
            }
            messages.push(template);
        }

        if !tokens.want_eof() {
            let found = tokens.next();
            expected(tokens, "end of template", found);
        }
        info!("read {} message templates", messages.len());

        TemplateParser { version, messages }
    }

    /// Tokenizes and parses `text`
    ///
    /// # Panics
    ///
    /// * The template is malformed in any way.
    pub fn parse(text: &str) -> TemplateParser {
        TemplateParser::new(&mut TemplateTokenizer::new(text))
    }

    /// Reads and parses the template file at `path`
    ///
    /// # Panics
    ///
    /// * The file was read but is malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<TemplateParser> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!("parsing message template {}", path.display());
        Ok(TemplateParser::parse(&text))
    }

    /// Parses `{ name frequency number trust encoding [deprecation] block* }`
    ///
    /// Returns None, consuming nothing, when the next token is not `{`.
    pub fn parse_message(tokens: &mut TemplateTokenizer) -> Option<MessageTemplate> {
        if !tokens.want("{") {
            return None;
        }

        let name = name(tokens, "message name");

        let token = tokens.next();
        let (frequency, fixed) = match token.as_str() {
            "High" => (Frequency::High, false),
            "Medium" => (Frequency::Medium, false),
            "Low" => (Frequency::Low, false),
            "Fixed" => (Frequency::Low, true),
            _ => invalid(tokens, "frequency", &token),
        };

        let token = tokens.next();
        let number = match message_number(&token) {
            Some(number) if fixed || number <= frequency.max_number() => number,
            _ => invalid(tokens, "message number", &token),
        };

        let token = tokens.next();
        let trust = match token.as_str() {
            "Trusted" => Trust::Trusted,
            "NotTrusted" => Trust::NotTrusted,
            _ => invalid(tokens, "trust", &token),
        };

        let token = tokens.next();
        let encoding = match token.as_str() {
            "Unencoded" => Encoding::Unencoded,
            "Zerocoded" => Encoding::Zerocoded,
            _ => invalid(tokens, "encoding", &token),
        };

        let deprecation = if tokens.want("Deprecated") {
            Deprecation::Deprecated
        } else if tokens.want("UDPDeprecated") {
            Deprecation::UdpDeprecated
        } else if tokens.want("UDPBlackListed") {
            Deprecation::UdpBlackListed
        } else {
            tokens.want("NotDeprecated");
            Deprecation::NotDeprecated
        };

        let mut template =
            MessageTemplate::new(name, frequency, number, trust, encoding, deprecation);
        while let Some(block) = TemplateParser::parse_block(tokens) {
            if template.block(block.name()).is_some() {
                duplicate(tokens, "block", block.name());
            }
            template.add_block(block);
        }
        want_close(tokens);

        Some(template)
    }

    /// Parses `{ name Single|Multiple <n>|Variable variable* }`
    ///
    /// Returns None, consuming nothing, when the next token is not `{`.
    pub fn parse_block(tokens: &mut TemplateTokenizer) -> Option<MessageBlock> {
        if !tokens.want("{") {
            return None;
        }

        let name = name(tokens, "block name");
        let token = tokens.next();
        let block_type = match token.as_str() {
            "Single" => BlockType::Single,
            "Multiple" => BlockType::Multiple(positive_integer(tokens, "block count")),
            "Variable" => BlockType::Variable,
            _ => invalid(tokens, "block type", &token),
        };

        let mut block = MessageBlock::new(name, block_type);
        while let Some(variable) = TemplateParser::parse_variable(tokens) {
            if block.variable(variable.name()).is_some() {
                duplicate(tokens, "variable", variable.name());
            }
            block.add_variable(variable);
        }
        want_close(tokens);

        Some(block)
    }

    /// Parses `{ name type [size] }`
    ///
    /// Returns None, consuming nothing, when the next token is not `{`.
    pub fn parse_variable(tokens: &mut TemplateTokenizer) -> Option<MessageVariable> {
        if !tokens.want("{") {
            return None;
        }

        let name = name(tokens, "variable name");
        let token = tokens.next();
        let typ = match VariableType::scalar(&token) {
            Some(typ) => typ,
            None if token == "Fixed" => VariableType::Fixed(positive_integer(tokens, "size")),
            None if token == "Variable" => {
                VariableType::Variable(positive_integer(tokens, "size"))
            }
            None => invalid(tokens, "variable type", &token),
        };
        want_close(tokens);

        Some(MessageVariable::new(name, typ))
    }

    pub fn version(&self) -> f32 {
        self.version
    }

    /// Kept templates in file order
    pub fn messages(&self) -> &[MessageTemplate] {
        &self.messages
    }

    pub fn find(&self, name: &str) -> Option<&MessageTemplate> {
        self.messages.iter().find(|m| m.name() == name)
    }

    pub fn find_by_id(&self, id: u32) -> Option<&MessageTemplate> {
        self.messages.iter().find(|m| m.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process;

    const TEST_MSG: &str = "version 2.0
{
	TestMsg Low 1 NotTrusted Zerocoded
	{
		Block1 Single
		{ Val U32 }
	}
}
";

    #[test]
    fn single_message() {
        let parser = TemplateParser::parse(TEST_MSG);
        assert_eq!(parser.version(), 2.0);
        assert_eq!(parser.messages().len(), 1);

        let msg = &parser.messages()[0];
        assert_eq!(msg.name(), "TestMsg");
        assert_eq!(msg.frequency(), Frequency::Low);
        assert_eq!(msg.number(), 1);
        assert_eq!(msg.id(), 0xFFFF_0001);
        assert_eq!(msg.trust(), Trust::NotTrusted);
        assert_eq!(msg.encoding(), Encoding::Zerocoded);
        assert_eq!(msg.deprecation(), Deprecation::NotDeprecated);

        assert_eq!(msg.blocks().len(), 1);
        let block = &msg.blocks()[0];
        assert_eq!(block.name(), "Block1");
        assert_eq!(block.block_type(), BlockType::Single);
        assert_eq!(block.total_size(), Some(4));
        assert_eq!(block.variables().len(), 1);
        assert_eq!(block.variables()[0].name(), "Val");
        assert_eq!(block.variables()[0].variable_type(), VariableType::U32);
        assert_eq!(block.variables()[0].size(), 4);
    }

    #[test]
    fn deprecated_messages_are_dropped() {
        let parser = TemplateParser::parse(
            "version 2.0
            { Gone High 1 Trusted Unencoded Deprecated }
            { Frowned High 2 Trusted Unencoded UDPDeprecated }
            { Banned High 3 Trusted Unencoded UDPBlackListed }
            { Fine High 4 Trusted Unencoded NotDeprecated }",
        );
        let names: Vec<&str> = parser.messages().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["Frowned", "Banned", "Fine"]);
        assert!(parser.find("Gone").is_none());
        assert!(parser.find("Banned").map_or(false, |m| m.is_udp_banned()));
        assert!(parser.find("Frowned").map_or(false, |m| m.is_udp_deprecated()));
    }

    #[test]
    fn frequencies_and_lookup() {
        let parser = TemplateParser::parse(
            "version 2.0
            // ids from each class
            { StartPingCheck High 1 NotTrusted Unencoded
                { PingID Single { PingID U8 } { OldestUnacked U32 } }
            }
            { ObjectUpdate Medium 0x0C Trusted Zerocoded
                { RegionData Single { RegionHandle U64 } { TimeDilation U16 } }
                { ObjectData Variable { ID U32 } { Data Variable 2 } }
            }
            { PacketAck Fixed 0xFFFFFFFB NotTrusted Unencoded
                { Packets Variable { ID U32 } }
            }
            { AgentAnimation Low 5 NotTrusted Unencoded
                { AnimationList Multiple 3 { AnimID LLUUID } { StartAnim BOOL } }
                { PhysicalAvatarEventList Variable { TypeData Fixed 8 } }
            }",
        );
        assert_eq!(parser.messages().len(), 4);

        let ping = parser.find_by_id(1).unwrap();
        assert_eq!(ping.name(), "StartPingCheck");
        assert_eq!(ping.blocks()[0].variables().len(), 2);
        assert_eq!(ping.blocks()[0].total_size(), Some(5));

        let update = parser.find_by_id(0xFF0C).unwrap();
        assert_eq!(update.name(), "ObjectUpdate");
        assert_eq!(update.encoding(), Encoding::Zerocoded);
        assert_eq!(update.block("RegionData").unwrap().total_size(), Some(10));
        let object_data = update.block("ObjectData").unwrap();
        assert_eq!(object_data.total_size(), None);
        assert_eq!(
            object_data.variable("Data").unwrap().variable_type(),
            VariableType::Variable(2)
        );

        let ack = parser.find("PacketAck").unwrap();
        assert_eq!(ack.frequency(), Frequency::Low);
        assert_eq!(ack.id(), 0xFFFF_FFFB);

        let anim = parser.find_by_id(0xFFFF_0005).unwrap();
        let list = anim.block("AnimationList").unwrap();
        assert_eq!(list.block_type(), BlockType::Multiple(3));
        assert_eq!(list.total_size(), Some(17));
        assert_eq!(anim.blocks()[1].name(), "PhysicalAvatarEventList");
        assert!(parser.find_by_id(2).is_none());
    }

    #[test]
    fn empty_template() {
        let parser = TemplateParser::parse("version 1.5 // nothing yet\n");
        assert_eq!(parser.version(), 1.5);
        assert!(parser.messages().is_empty());
    }

    #[test]
    fn parse_functions_leave_other_tokens_alone() {
        let mut tokens = TemplateTokenizer::new("}");
        assert!(TemplateParser::parse_message(&mut tokens).is_none());
        assert!(TemplateParser::parse_block(&mut tokens).is_none());
        assert!(TemplateParser::parse_variable(&mut tokens).is_none());
        assert_eq!(tokens.next(), "}");

        let mut tokens = TemplateTokenizer::new("{ Size Fixed 32 } {");
        let variable = TemplateParser::parse_variable(&mut tokens).unwrap();
        assert_eq!(variable.variable_type(), VariableType::Fixed(32));
        assert!(!tokens.want_eof());
    }

    #[test]
    fn from_file() {
        let path = env::temp_dir().join(format!("message_template_{}.msg", process::id()));
        fs::write(&path, TEST_MSG).unwrap();
        let parser = TemplateParser::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(parser.find("TestMsg").is_some());

        assert!(TemplateParser::from_file(&path).is_err());
    }

    #[test]
    #[should_panic(expected = "line 1: expected 'version'")]
    fn missing_version() {
        TemplateParser::parse("{ TestMsg Low 1 NotTrusted Zerocoded }");
    }

    #[test]
    #[should_panic(expected = "invalid version \"two\"")]
    fn unparseable_version() {
        TemplateParser::parse("version two");
    }

    #[test]
    #[should_panic(expected = "line 3: expected end of template")]
    fn trailing_tokens() {
        TemplateParser::parse("version 2.0\n{ A High 1 Trusted Unencoded }\nextra");
    }

    #[test]
    #[should_panic(expected = "unexpected end of template")]
    fn unclosed_message() {
        TemplateParser::parse("version 2.0\n{ A High 1 Trusted Unencoded\n{ B Single }");
    }

    #[test]
    #[should_panic(expected = "invalid message name \"9Lives\"")]
    fn bad_identifier() {
        TemplateParser::parse("version 2.0 { 9Lives High 1 Trusted Unencoded }");
    }

    #[test]
    #[should_panic(expected = "invalid frequency \"Often\"")]
    fn bad_frequency() {
        TemplateParser::parse("version 2.0 { A Often 1 Trusted Unencoded }");
    }

    #[test]
    #[should_panic(expected = "invalid message number \"256\"")]
    fn number_outside_class() {
        TemplateParser::parse("version 2.0 { A High 256 Trusted Unencoded }");
    }

    #[test]
    #[should_panic(expected = "invalid message number \"0xZZ\"")]
    fn bad_hex_number() {
        TemplateParser::parse("version 2.0 { A Low 0xZZ Trusted Unencoded }");
    }

    #[test]
    #[should_panic(expected = "invalid trust \"Maybe\"")]
    fn bad_trust() {
        TemplateParser::parse("version 2.0 { A Low 1 Maybe Unencoded }");
    }

    #[test]
    #[should_panic(expected = "invalid encoding \"Gzip\"")]
    fn bad_encoding() {
        TemplateParser::parse("version 2.0 { A Low 1 Trusted Gzip }");
    }

    #[test]
    #[should_panic(expected = "invalid block type \"Several\"")]
    fn bad_block_type() {
        TemplateParser::parse("version 2.0 { A Low 1 Trusted Unencoded { B Several } }");
    }

    #[test]
    #[should_panic(expected = "invalid block count \"0\"")]
    fn zero_block_count() {
        TemplateParser::parse("version 2.0 { A Low 1 Trusted Unencoded { B Multiple 0 } }");
    }

    #[test]
    #[should_panic(expected = "invalid variable type \"U24\"")]
    fn bad_variable_type() {
        TemplateParser::parse(
            "version 2.0 { A Low 1 Trusted Unencoded { B Single { C U24 } } }",
        );
    }

    #[test]
    #[should_panic(expected = "invalid size \"-4\"")]
    fn bad_fixed_size() {
        TemplateParser::parse(
            "version 2.0 { A Low 1 Trusted Unencoded { B Single { C Fixed -4 } } }",
        );
    }

    #[test]
    #[should_panic(expected = "line 4: duplicate variable \"C\"")]
    fn duplicate_variable() {
        TemplateParser::parse(
            "version 2.0\n{ A Low 1 Trusted Unencoded\n{ B Single\n{ C U8 } { C U16 } } }",
        );
    }

    #[test]
    #[should_panic(expected = "duplicate block \"B\"")]
    fn duplicate_block() {
        TemplateParser::parse(
            "version 2.0 { A Low 1 Trusted Unencoded { B Single } { B Variable } }",
        );
    }

    #[test]
    #[should_panic(expected = "expected '}', found \"U8\"")]
    fn unclosed_variable() {
        TemplateParser::parse(
            "version 2.0 { A Low 1 Trusted Unencoded { B Single { C U8 U8 } } }",
        );
    }
}
