use std::collections::HashMap;

use core_grid::Value;

/// Process-wide key/value store backing the `w`/`C`/`u`/`d`/`x` instructions.
/// Keys and values are arbitrary [`Value`]s, matching the source's untyped
/// dict.
#[derive(Debug, Default)]
pub struct Memory {
    cells: HashMap<Value, Value>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.cells.get(key).cloned()
    }

    pub fn set(&mut self, key: Value, value: Value) {
        self.cells.insert(key, value);
    }

    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.cells
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
