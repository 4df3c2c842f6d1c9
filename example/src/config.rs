//! Configuration types for `proto/service.proto`, shaped the way prost
//! generates them: wrappers and messages are `Option<T>`, enums are stored
//! as `i32`.

use std::collections::HashMap;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Service {
    pub name:      String,
    pub timeout:   Option<i32>,
    pub tags:      Vec<i32>,
    pub opts:      HashMap<String, String>,
    pub reporting: Option<Reporting>,
    pub accent:    i32,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Reporting {
    pub endpoint:     String,
    pub port:         Option<u32>,
    pub secure:       bool,
    pub sample_ratio: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum Color {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Color {
    /// String value of the enum field names used in the ProtoBuf definition.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Green => "GREEN",
            Color::Blue => "BLUE",
        }
    }

    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "RED" => Some(Self::Red),
            "GREEN" => Some(Self::Green),
            "BLUE" => Some(Self::Blue),
            _ => None,
        }
    }
}

impl TryFrom<i32> for Color {
    type Error = i32;

    fn try_from(value: i32) -> Result<Color, i32> {
        match value {
            0 => Ok(Color::Red),
            1 => Ok(Color::Green),
            2 => Ok(Color::Blue),
            other => Err(other),
        }
    }
}

// Regenerate with `protoenv-gen -o src/generated proto/service.proto`.
include!("generated/service.pbloader.rs");
