//! The DATA pool and its read pointer.

use super::super::ast::DataValue;
use super::super::error::{BasicError, BasicErrorKind};
use super::super::value::Value;

#[derive(Default)]
pub struct DataManager {
    items: Vec<DataValue>,
    pointer: usize,
}

impl DataManager {
    pub fn new() -> DataManager {
        DataManager::default()
    }

    /// Install the constants the parser collected, in program order.
    pub fn load(&mut self, items: &[DataValue]) {
        self.items = items.to_vec();
        self.pointer = 0;
    }

    /// The next DATA constant, or OUT OF DATA.
    pub fn read(&mut self) -> Result<Value, BasicError> {
        match self.items.get(self.pointer) {
            Some(item) => {
                self.pointer += 1;
                Ok(item.value.clone())
            }
            None => Err(BasicError::new(BasicErrorKind::OutOfData)),
        }
    }

    /// RESTORE: rewind to the very beginning.
    pub fn restore(&mut self) {
        self.pointer = 0;
    }

    /// RESTORE n: rewind to the first constant defined on line >= n.
    pub fn restore_to_line(&mut self, line: u16) {
        self.pointer = self
            .items
            .iter()
            .position(|item| item.line_number >= line)
            .unwrap_or(self.items.len());
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> DataManager {
        let mut data = DataManager::new();
        data.load(&[
            DataValue {
                line_number: 10,
                value: Value::Number(1.0),
            },
            DataValue {
                line_number: 10,
                value: Value::Number(2.0),
            },
            DataValue {
                line_number: 30,
                value: Value::Str("THREE".into()),
            },
        ]);
        data
    }

    #[test]
    fn reads_in_order_until_exhausted() {
        let mut data = pool();
        assert_eq!(data.read().unwrap(), Value::Number(1.0));
        assert_eq!(data.read().unwrap(), Value::Number(2.0));
        assert_eq!(data.read().unwrap(), Value::Str("THREE".into()));
        assert_eq!(data.read().unwrap_err().kind, BasicErrorKind::OutOfData);
    }

    #[test]
    fn restore_rewinds_everything() {
        let mut data = pool();
        data.read().unwrap();
        data.read().unwrap();
        data.restore();
        assert_eq!(data.read().unwrap(), Value::Number(1.0));
    }

    #[test]
    fn restore_to_line_seeks_forward() {
        let mut data = pool();
        data.restore_to_line(20);
        assert_eq!(data.read().unwrap(), Value::Str("THREE".into()));
        // past every line: next read is out of data
        data.restore_to_line(99);
        assert!(data.read().is_err());
    }
}
