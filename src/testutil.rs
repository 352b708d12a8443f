//! A minimal in-memory [`crate::entity::EntitySource`] for binder and
//! parser tests, standing in for the real wire decoder.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::entity::{Entity, EntityId, EntitySource, PropertyValue};
use crate::error::ParseError;

#[derive(Debug, Clone, Default)]
pub struct FakeEntity {
    pub id: EntityId,
    pub server_class_name: String,
    pub position: Vector3<f32>,
    pub properties: HashMap<String, PropertyValue>,
}

impl FakeEntity {
    pub fn new(id: EntityId, server_class_name: &str) -> Self {
        FakeEntity {
            id,
            server_class_name: server_class_name.to_string(),
            position: Vector3::zeros(),
            properties: HashMap::new(),
        }
    }

    pub fn with_prop(mut self, path: &str, value: PropertyValue) -> Self {
        self.properties.insert(path.to_string(), value);
        self
    }
}

impl Entity for FakeEntity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn server_class_name(&self) -> &str {
        &self.server_class_name
    }

    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn property_value(&self, path: &str) -> Option<PropertyValue> {
        self.properties.get(path).cloned()
    }
}

/// A scripted sequence of frames: each `advance()` call installs the next
/// snapshot of entities wholesale.
#[derive(Debug, Default)]
pub struct FakeEntitySource {
    pub frames: Vec<Vec<FakeEntity>>,
    pub tick_rate: f64,
    current_frame: i32,
    current_tick: i32,
    current: HashMap<EntityId, FakeEntity>,
}

impl FakeEntitySource {
    pub fn new(tick_rate: f64) -> Self {
        FakeEntitySource {
            frames: Vec::new(),
            tick_rate,
            current_frame: -1,
            current_tick: -1,
            current: HashMap::new(),
        }
    }

    pub fn push_frame(&mut self, entities: Vec<FakeEntity>) {
        self.frames.push(entities);
    }
}

impl EntitySource for FakeEntitySource {
    fn advance(&mut self) -> Result<bool, ParseError> {
        let next_index = (self.current_frame + 1) as usize;
        let Some(frame) = self.frames.get(next_index) else {
            return Ok(false);
        };
        self.current_frame += 1;
        self.current_tick += 1;
        self.current = frame.iter().cloned().map(|e| (e.id, e)).collect();
        Ok(true)
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    fn tick_interval(&self) -> f64 {
        if self.tick_rate <= 0.0 {
            0.0
        } else {
            1.0 / self.tick_rate
        }
    }

    fn current_frame(&self) -> i32 {
        self.current_frame
    }

    fn current_tick(&self) -> i32 {
        self.current_tick
    }

    fn entities(&self) -> Vec<&dyn Entity> {
        self.current.values().map(|e| e as &dyn Entity).collect()
    }

    fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        self.current.get(&id).map(|e| e as &dyn Entity)
    }
}

/// A `log::Log` implementation that stores formatted records instead of
/// printing them, so binder tests can assert on silent-tolerance/warning
/// log output without scraping stdout. Not installed globally; construct
/// one and call its methods directly to exercise a binder's logging.
#[derive(Default)]
pub struct CapturingLogger {
    records: std::sync::Mutex<Vec<(log::Level, String)>>,
}

impl CapturingLogger {
    pub fn new() -> Self {
        CapturingLogger::default()
    }

    pub fn records(&self) -> Vec<(log::Level, String)> {
        self.records.lock().unwrap().clone()
    }
}

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.records.lock().unwrap().push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}
