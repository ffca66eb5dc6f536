/// Typed argument values.
///
/// An `ArgValue` is what an argument parser produces: the strongly-typed
/// form of one raw token or rich segment, handed to the command
/// implementation after resolution.
use herald_core::{Bot, Friend, Group, Member, MessageSegment};

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i32),
    Long(i64),
    Short(i16),
    Byte(i8),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
    Segment(MessageSegment),
    Bot(Bot),
    Friend(Friend),
    Group(Group),
    Member(Member),
    Enum { enum_name: String, variant: String },
    /// The merged value of a vararg parameter (possibly empty).
    List(Vec<ArgValue>),
}

impl ArgValue {
    /// Convenience accessor for string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}
