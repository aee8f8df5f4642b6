//! Packet construction.
//!
//! Sections have to be written in wire order. The builder's type parameter
//! is the section written last, so adding a question after an answer does
//! not compile.

use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use super::{Header, Name, Opcode, QueryClass, QueryType, RRData, ResponseCode, HEADER_SIZE};

pub enum Questions {}
pub enum Answers {}
pub enum Nameservers {}
pub enum Additional {}

pub trait MoveTo<T> {}
impl<T> MoveTo<T> for T {}

impl MoveTo<Answers> for Questions {}

impl MoveTo<Nameservers> for Questions {}
impl MoveTo<Nameservers> for Answers {}

impl MoveTo<Additional> for Questions {}
impl MoveTo<Additional> for Answers {}
impl MoveTo<Additional> for Nameservers {}

/// DNS packet under construction
///
/// Writes go to a `Vec`, which cannot fail; the only panic is a section
/// count overflowing 65535.
pub struct Builder<S> {
    buf: Vec<u8>,
    _state: PhantomData<S>,
}

impl Builder<Questions> {
    /// Starts a standard query with every section empty
    pub fn new_query(id: u16, recursion: bool) -> Builder<Questions> {
        Builder::start(Header {
            id,
            query: true,
            opcode: Opcode::StandardQuery,
            authoritative: false,
            truncated: false,
            recursion_desired: recursion,
            recursion_available: false,
            response_code: ResponseCode::NoError,
            questions: 0,
            answers: 0,
            nameservers: 0,
            additional: 0,
        })
    }

    /// Starts a NOERROR response to query `id`
    #[allow(dead_code)]
    pub fn new_response(id: u16, recursion: bool, authoritative: bool) -> Builder<Questions> {
        Builder::start(Header {
            id,
            query: false,
            opcode: Opcode::StandardQuery,
            authoritative,
            truncated: false,
            recursion_desired: recursion,
            recursion_available: recursion,
            response_code: ResponseCode::NoError,
            questions: 0,
            answers: 0,
            nameservers: 0,
            additional: 0,
        })
    }

    /// The packet the resolver sends: one IN question, recursion desired
    pub fn query(id: u16, qname: &Name, qtype: QueryType) -> Vec<u8> {
        Builder::new_query(id, true)
            .add_question(qname, qtype, QueryClass::IN)
            .build()
    }

    fn start(header: Header) -> Builder<Questions> {
        let mut buf = Vec::with_capacity(512);
        buf.resize(HEADER_SIZE, 0);
        header.write(&mut buf[..HEADER_SIZE]);
        Builder {
            buf,
            _state: PhantomData,
        }
    }
}

impl<T> Builder<T> {
    /// Skips ahead to section `U`
    #[allow(dead_code)]
    pub fn move_to<U>(self) -> Builder<U>
    where
        T: MoveTo<U>,
    {
        Builder {
            buf: self.buf,
            _state: PhantomData,
        }
    }

    fn write_rr(&mut self, name: &Name, cls: QueryClass, ttl: u32, data: &RRData) {
        name.write_to(&mut self.buf).unwrap();
        self.buf.write_u16::<BigEndian>(data.type_code()).unwrap();
        self.buf.write_u16::<BigEndian>(cls as u16).unwrap();
        self.buf.write_u32::<BigEndian>(ttl).unwrap();

        // rdata length, patched once the rdata is written
        let size_offset = self.buf.len();
        self.buf.write_u16::<BigEndian>(0).unwrap();
        data.write_to(&mut self.buf).unwrap();
        let data_size = self.buf.len() - size_offset - 2;
        BigEndian::write_u16(
            &mut self.buf[size_offset..size_offset + 2],
            data_size as u16,
        );
    }

    fn add_rr<U>(
        self,
        name: &Name,
        cls: QueryClass,
        ttl: u32,
        data: &RRData,
        count: fn(&mut [u8]) -> Option<u16>,
    ) -> Builder<U>
    where
        T: MoveTo<U>,
    {
        let mut builder = self.move_to::<U>();
        builder.write_rr(name, cls, ttl, data);
        if count(&mut builder.buf).is_none() {
            panic!("more than 65535 records in one section");
        }
        builder
    }

    /// Replaces the response code in the header
    #[allow(dead_code)]
    pub fn response_code(mut self, code: ResponseCode) -> Builder<T> {
        Header::set_response_code(&mut self.buf[..HEADER_SIZE], code);
        self
    }

    /// Returns the encoded packet
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl<T: MoveTo<Questions>> Builder<T> {
    /// Adds a question to the packet
    ///
    /// # Panics
    ///
    /// * There are already 65535 questions in the buffer.
    pub fn add_question(
        self,
        qname: &Name,
        qtype: QueryType,
        qclass: QueryClass,
    ) -> Builder<Questions> {
        let mut builder = self.move_to::<Questions>();

        qname.write_to(&mut builder.buf).unwrap();
        builder.buf.write_u16::<BigEndian>(qtype as u16).unwrap();
        builder.buf.write_u16::<BigEndian>(qclass as u16).unwrap();
        if Header::inc_questions(&mut builder.buf).is_none() {
            panic!("more than 65535 questions");
        }
        builder
    }
}

#[allow(dead_code)]
impl<T: MoveTo<Answers>> Builder<T> {
    pub fn add_answer(
        self,
        name: &Name,
        cls: QueryClass,
        ttl: u32,
        data: &RRData,
    ) -> Builder<Answers> {
        self.add_rr(name, cls, ttl, data, Header::inc_answers)
    }
}

#[allow(dead_code)]
impl<T: MoveTo<Nameservers>> Builder<T> {
    pub fn add_nameserver(
        self,
        name: &Name,
        cls: QueryClass,
        ttl: u32,
        data: &RRData,
    ) -> Builder<Nameservers> {
        self.add_rr(name, cls, ttl, data, Header::inc_nameservers)
    }
}

#[allow(dead_code)]
impl<T: MoveTo<Additional>> Builder<T> {
    pub fn add_additional(
        self,
        name: &Name,
        cls: QueryClass,
        ttl: u32,
        data: &RRData,
    ) -> Builder<Additional> {
        self.add_rr(name, cls, ttl, data, Header::inc_additional)
    }
}
