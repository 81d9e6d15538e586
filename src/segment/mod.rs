//! Segments: the numbered, versioned units of a FinTS message
//!
//! - [`codec`] - escaping, wire encoding, parsing, length placeholders
//! - [`builders`] - outbound segments for the supported business operations

pub mod builders;
pub mod codec;

use std::fmt;

use crate::error::Result;

/// One data element inside a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataElement {
    /// Unescaped text value
    Text(String),
    /// Raw bytes, written as `@len@bytes`
    Binary(Vec<u8>),
}

impl DataElement {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataElement::Text(t) => Some(t),
            DataElement::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            DataElement::Text(t) => t.as_bytes(),
            DataElement::Binary(b) => b,
        }
    }
}

/// Elements separated by `:`; never empty (an empty group is one empty text)
pub type DataGroup = Vec<DataElement>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Segment id, e.g. `HKKAZ`
    pub name: String,
    /// Position within the message, assigned by the assembler
    pub number: u16,
    pub version: u16,
    /// Number of the request segment this one answers
    pub reference: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub header: SegmentHeader,
    pub groups: Vec<DataGroup>,
}

impl Segment {
    /// Unnumbered segment; the message assembler assigns the number
    pub fn new(name: impl Into<String>, version: u16) -> Self {
        Self {
            header: SegmentHeader {
                name: name.into(),
                number: 0,
                version,
                reference: None,
            },
            groups: Vec::new(),
        }
    }

    pub fn numbered(mut self, number: u16) -> Self {
        self.header.number = number;
        self
    }

    pub fn referencing(mut self, reference: u16) -> Self {
        self.header.reference = Some(reference);
        self
    }

    /// Append a group holding one text element
    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.groups.push(vec![DataElement::Text(value.into())]);
        self
    }

    /// Append a group of text elements
    pub fn texts<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group: DataGroup = values
            .into_iter()
            .map(|v| DataElement::Text(v.into()))
            .collect();
        if group.is_empty() {
            return self.empty();
        }
        self.groups.push(group);
        self
    }

    /// Append a group of mixed elements
    pub fn group(mut self, elements: DataGroup) -> Self {
        if elements.is_empty() {
            return self.empty();
        }
        self.groups.push(elements);
        self
    }

    /// Append an empty group
    pub fn empty(self) -> Self {
        self.text("")
    }

    /// Append `count` empty groups
    pub fn empties(mut self, count: usize) -> Self {
        for _ in 0..count {
            self = self.empty();
        }
        self
    }

    /// Append a group holding one binary element
    pub fn binary(mut self, bytes: Vec<u8>) -> Self {
        self.groups.push(vec![DataElement::Binary(bytes)]);
        self
    }

    /// Drop empty groups at the end (optional trailing fields)
    pub fn trimmed(mut self) -> Self {
        while self
            .groups
            .last()
            .is_some_and(|g| g.iter().all(|e| e.as_bytes().is_empty() && e.as_text().is_some()))
        {
            self.groups.pop();
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Element `element` of data group `group` (0 = first group after the header)
    pub fn element(&self, group: usize, element: usize) -> Option<&DataElement> {
        self.groups.get(group)?.get(element)
    }

    pub fn text_at(&self, group: usize, element: usize) -> Option<&str> {
        self.element(group, element)?.as_text()
    }

    /// Non-empty text at the position, if any
    pub fn value_at(&self, group: usize, element: usize) -> Option<&str> {
        self.text_at(group, element).filter(|t| !t.is_empty())
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode_segment(self)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.header.name, self.header.number, self.header.version
        )
    }
}
