//! Fixed-width element types.
//!
//! The file never records how wide a matrix or vector element is, so the
//! width and signedness travel in the Rust type chosen by the caller.

use std::fmt;
use std::str::FromStr;

use model_blob_buffers::{BufferError, Reader, Writer};
use serde::{Deserialize, Serialize};

/// Runtime name of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    F32,
    F64,
    I16,
    U16,
    I32,
    U32,
    I64,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        ElementKind::F32,
        ElementKind::F64,
        ElementKind::I16,
        ElementKind::U16,
        ElementKind::I32,
        ElementKind::U32,
        ElementKind::I64,
    ];

    /// Size of one element in bytes.
    pub const fn width(self) -> usize {
        match self {
            ElementKind::I16 | ElementKind::U16 => 2,
            ElementKind::F32 | ElementKind::I32 | ElementKind::U32 => 4,
            ElementKind::F64 | ElementKind::I64 => 8,
        }
    }

    /// Byte used for this kind in a tagged header.
    pub const fn tag(self) -> u8 {
        match self {
            ElementKind::F32 => 0x01,
            ElementKind::F64 => 0x02,
            ElementKind::I16 => 0x10,
            ElementKind::U16 => 0x11,
            ElementKind::I32 => 0x12,
            ElementKind::U32 => 0x13,
            ElementKind::I64 => 0x14,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
            ElementKind::I16 => "i16",
            ElementKind::U16 => "u16",
            ElementKind::I32 => "i32",
            ElementKind::U32 => "u32",
            ElementKind::I64 => "i64",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown element type `{}`", s))
    }
}

/// A primitive that can be stored in the matrix or vector sections.
pub trait Element: Copy + PartialEq + fmt::Debug {
    const KIND: ElementKind;

    fn write(self, writer: &mut Writer);

    fn read(reader: &mut Reader<'_>) -> Result<Self, BufferError>;
}

macro_rules! impl_element {
    ($($ty:ident => $kind:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const KIND: ElementKind = ElementKind::$kind;

                #[inline]
                fn write(self, writer: &mut Writer) {
                    writer.$ty(self);
                }

                #[inline]
                fn read(reader: &mut Reader<'_>) -> Result<Self, BufferError> {
                    reader.$ty()
                }
            }
        )*
    };
}

impl_element! {
    f32 => F32,
    f64 => F64,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
}
