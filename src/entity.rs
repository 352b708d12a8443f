//! The entity-source contract this crate depends on.
//!
//! The wire decoder that turns raw demo bytes into entity/property deltas is
//! out of scope here (see the purpose & scope section of the design docs);
//! this module only defines the trait surface binders are written against.

use nalgebra::Vector3;

/// Low bits of a handle that select the entity id. CS2 entities are indexed
/// in a flat table capped well below 2^15.
pub const INDEX_MASK: u32 = 0x7FFF;

/// Sentinel handle value meaning "no entity".
pub const INVALID_ENTITY_HANDLE: u32 = 0xFFFF_FFFF;

/// A stable identifier for one live entity slot. Indices are reused once an
/// entity is destroyed, so an `EntityId` alone says nothing about identity
/// across time; callers resolve through the entity source or `GameState`.
pub type EntityId = u32;

/// Decomposes a packed entity handle into its entity id, or `None` if the
/// handle is the reserved invalid value.
pub fn handle_to_entity_id(handle: u32) -> Option<EntityId> {
    if handle == INVALID_ENTITY_HANDLE {
        None
    } else {
        Some(handle & INDEX_MASK)
    }
}

/// A duck-typed property value. The entity source hands these back from
/// property reads; exactly one variant is ever populated for a given path on
/// a given server class, but callers ask for the variant they expect and get
/// a default/zero back on mismatch rather than a panic, since many optional
/// properties simply don't exist on a given server class.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    Str(String),
    Handle(u32),
    U32(u32),
    U64(u64),
    Vec3(Vector3<f32>),
    Array(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn int(&self) -> i64 {
        match self {
            PropertyValue::Int(v) => *v,
            PropertyValue::U32(v) => *v as i64,
            PropertyValue::U64(v) => *v as i64,
            PropertyValue::Bool(v) => *v as i64,
            _ => 0,
        }
    }

    pub fn float(&self) -> f32 {
        match self {
            PropertyValue::Float(v) => *v,
            PropertyValue::Int(v) => *v as f32,
            _ => 0.0,
        }
    }

    pub fn bool_val(&self) -> bool {
        match self {
            PropertyValue::Bool(v) => *v,
            PropertyValue::Int(v) => *v != 0,
            _ => false,
        }
    }

    pub fn str(&self) -> &str {
        match self {
            PropertyValue::Str(v) => v.as_str(),
            _ => "",
        }
    }

    pub fn handle(&self) -> u32 {
        match self {
            PropertyValue::Handle(v) => *v,
            PropertyValue::U32(v) => *v,
            _ => INVALID_ENTITY_HANDLE,
        }
    }

    pub fn s2_u32(&self) -> u32 {
        match self {
            PropertyValue::U32(v) => *v,
            PropertyValue::Int(v) => *v as u32,
            _ => 0,
        }
    }

    pub fn s2_u64(&self) -> u64 {
        match self {
            PropertyValue::U64(v) => *v,
            PropertyValue::U32(v) => *v as u64,
            PropertyValue::Int(v) => *v as u64,
            _ => 0,
        }
    }

    pub fn r3_vec(&self) -> Vector3<f32> {
        match self {
            PropertyValue::Vec3(v) => *v,
            _ => Vector3::zeros(),
        }
    }

    pub fn array(&self) -> &[PropertyValue] {
        match self {
            PropertyValue::Array(v) => v.as_slice(),
            _ => &[],
        }
    }
}

/// Handle to a registered server-class. Binders look these up by name at
/// construction time and attach lifecycle/property callbacks to them.
pub trait ServerClass {
    fn name(&self) -> &str;
}

/// One live (or recently live) entity as exposed by the entity source.
///
/// Binders never own entities; they borrow references handed to them by
/// lifecycle callbacks and read/subscribe to properties by path.
pub trait Entity {
    fn id(&self) -> EntityId;
    fn server_class_name(&self) -> &str;
    fn position(&self) -> Vector3<f32>;
    fn property_value(&self, path: &str) -> Option<PropertyValue>;

    fn property_value_must(&self, path: &str) -> PropertyValue {
        self.property_value(path).unwrap_or(PropertyValue::Int(0))
    }
}

/// Drives demo playback one frame (a `net_tick`-bounded packet group) at a
/// time. Implemented by the wire decoder, which is out of scope for this
/// crate; `crate::testutil::FakeEntitySource` provides a minimal
/// implementation for tests.
pub trait EntitySource {
    /// Decodes and applies the next frame's entity/property deltas,
    /// returning `false` once the stream is exhausted.
    fn advance(&mut self) -> Result<bool, crate::error::ParseError>;

    fn tick_rate(&self) -> f64;
    fn tick_interval(&self) -> f64;
    fn current_frame(&self) -> i32;
    fn current_tick(&self) -> i32;

    /// Every entity live as of the most recently applied frame.
    fn entities(&self) -> Vec<&dyn Entity>;

    fn entity(&self, id: EntityId) -> Option<&dyn Entity>;
}
