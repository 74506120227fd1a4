//! Scalar variables and arrays.
//!
//! Names are canonicalized the Applesoft way: the first two characters plus
//! the type suffix, so COUNT and COUNTRY are the same cell. That quirk is a
//! load-bearing compatibility requirement, not an accident; every table in
//! the runtime (scalars, arrays, DEF FNs) goes through `canonical_name`.

use std::collections::HashMap;

use super::super::error::{BasicError, BasicErrorKind};
use super::super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Real,
    Integer,
    Str,
}

/// The variable's type, from its suffix.
pub fn var_type(name: &str) -> VarType {
    if name.ends_with('$') {
        VarType::Str
    } else if name.ends_with('%') {
        VarType::Integer
    } else {
        VarType::Real
    }
}

/// First two characters, upper-cased, plus the suffix.
pub fn canonical_name(name: &str) -> String {
    let (base, suffix) = match name.char_indices().find(|(_, c)| *c == '$' || *c == '%') {
        Some((i, _)) => name.split_at(i),
        None => (name, ""),
    };
    let mut canonical: String = base.chars().take(2).collect::<String>().to_ascii_uppercase();
    canonical.push_str(suffix);
    canonical
}

fn default_value(ty: VarType) -> Value {
    match ty {
        VarType::Str => Value::Str(String::new()),
        _ => Value::Number(0.0),
    }
}

/// Check a value against the slot's type and normalize it. Integer slots
/// truncate toward zero and must fit ±32767.
fn conform(ty: VarType, value: Value) -> Result<Value, BasicError> {
    match (ty, value) {
        (VarType::Str, Value::Str(s)) => Ok(Value::Str(s)),
        (VarType::Str, Value::Number(_)) => {
            Err(BasicError::new(BasicErrorKind::TypeMismatch))
        }
        (_, Value::Str(_)) => Err(BasicError::new(BasicErrorKind::TypeMismatch)),
        (VarType::Integer, Value::Number(n)) => {
            let truncated = n.trunc();
            if !(-32767.0..=32767.0).contains(&truncated) {
                return Err(BasicError::new(BasicErrorKind::IllegalQuantity));
            }
            Ok(Value::Number(truncated))
        }
        (VarType::Real, Value::Number(n)) => Ok(Value::Number(n)),
    }
}

#[derive(Default)]
pub struct VariableManager {
    vars: HashMap<String, Value>,
}

impl VariableManager {
    pub fn new() -> VariableManager {
        VariableManager::default()
    }

    /// Read a variable; unset variables have their type's default.
    pub fn get(&self, name: &str) -> Value {
        let canonical = canonical_name(name);
        self.vars
            .get(&canonical)
            .cloned()
            .unwrap_or_else(|| default_value(var_type(&canonical)))
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<(), BasicError> {
        let canonical = canonical_name(name);
        let value = conform(var_type(&canonical), value)?;
        self.vars.insert(canonical, value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }
}

struct BasicArray {
    /// Maximum index per dimension, as DIM'd
    bounds: Vec<usize>,
    values: Vec<Value>,
}

impl BasicArray {
    fn new(ty: VarType, bounds: Vec<usize>) -> BasicArray {
        let size = bounds.iter().map(|b| b + 1).product();
        BasicArray {
            bounds,
            values: vec![default_value(ty); size],
        }
    }

    /// Row-major offset, with bounds checking.
    fn offset(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.bounds.len() {
            return None;
        }
        let mut offset = 0;
        for (index, bound) in indices.iter().zip(&self.bounds) {
            if index > bound {
                return None;
            }
            offset = offset * (bound + 1) + index;
        }
        Some(offset)
    }
}

#[derive(Default)]
pub struct ArrayManager {
    arrays: HashMap<String, BasicArray>,
}

impl ArrayManager {
    pub fn new() -> ArrayManager {
        ArrayManager::default()
    }

    /// DIM. Dimensioning a name twice is an error.
    pub fn dim(&mut self, name: &str, bounds: Vec<usize>) -> Result<(), BasicError> {
        let canonical = canonical_name(name);
        if self.arrays.contains_key(&canonical) {
            return Err(BasicError::new(BasicErrorKind::RedimdArray));
        }
        let ty = var_type(&canonical);
        self.arrays.insert(canonical, BasicArray::new(ty, bounds));
        Ok(())
    }

    /// First touch without a DIM auto-dimensions to 0..=10 per dimension.
    fn ensure(&mut self, canonical: &str, rank: usize) -> &mut BasicArray {
        let ty = var_type(canonical);
        self.arrays
            .entry(canonical.to_string())
            .or_insert_with(|| BasicArray::new(ty, vec![10; rank]))
    }

    pub fn get(&mut self, name: &str, indices: &[usize]) -> Result<Value, BasicError> {
        let canonical = canonical_name(name);
        let array = self.ensure(&canonical, indices.len());
        let offset = array
            .offset(indices)
            .ok_or_else(|| BasicError::new(BasicErrorKind::IllegalQuantity))?;
        Ok(array.values[offset].clone())
    }

    pub fn set(&mut self, name: &str, indices: &[usize], value: Value) -> Result<(), BasicError> {
        let canonical = canonical_name(name);
        let value = conform(var_type(&canonical), value)?;
        let array = self.ensure(&canonical, indices.len());
        let offset = array
            .offset(indices)
            .ok_or_else(|| BasicError::new(BasicErrorKind::IllegalQuantity))?;
        array.values[offset] = value;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.arrays.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_character_aliasing() {
        assert_eq!(canonical_name("COUNT"), "CO");
        assert_eq!(canonical_name("country"), "CO");
        assert_eq!(canonical_name("A"), "A");
        assert_eq!(canonical_name("NAME$"), "NA$");
        assert_eq!(canonical_name("X1%"), "X1%");
    }

    #[test]
    fn aliased_names_share_a_cell() {
        let mut vars = VariableManager::new();
        vars.set("COUNT", Value::Number(5.0)).unwrap();
        assert_eq!(vars.get("COUNTRY"), Value::Number(5.0));
    }

    #[test]
    fn defaults_by_type() {
        let vars = VariableManager::new();
        assert_eq!(vars.get("X"), Value::Number(0.0));
        assert_eq!(vars.get("X$"), Value::Str(String::new()));
        assert_eq!(vars.get("X%"), Value::Number(0.0));
    }

    #[test]
    fn type_mismatch_on_assignment() {
        let mut vars = VariableManager::new();
        let err = vars.set("A$", Value::Number(1.0)).unwrap_err();
        assert_eq!(err.kind, BasicErrorKind::TypeMismatch);
        let err = vars.set("A", Value::Str("X".into())).unwrap_err();
        assert_eq!(err.kind, BasicErrorKind::TypeMismatch);
    }

    #[test]
    fn integer_variables_truncate_and_range_check() {
        let mut vars = VariableManager::new();
        vars.set("N%", Value::Number(2.9)).unwrap();
        assert_eq!(vars.get("N%"), Value::Number(2.0));
        let err = vars.set("N%", Value::Number(40000.0)).unwrap_err();
        assert_eq!(err.kind, BasicErrorKind::IllegalQuantity);
    }

    #[test]
    fn arrays_auto_dimension_to_ten() {
        let mut arrays = ArrayManager::new();
        assert_eq!(arrays.get("A", &[10]).unwrap(), Value::Number(0.0));
        let err = arrays.get("A", &[11]).unwrap_err();
        assert_eq!(err.kind, BasicErrorKind::IllegalQuantity);
    }

    #[test]
    fn redim_is_an_error() {
        let mut arrays = ArrayManager::new();
        arrays.dim("A", vec![5]).unwrap();
        let err = arrays.dim("A", vec![5]).unwrap_err();
        assert_eq!(err.kind, BasicErrorKind::RedimdArray);
    }

    #[test]
    fn multidimensional_offsets() {
        let mut arrays = ArrayManager::new();
        arrays.dim("G", vec![2, 3]).unwrap();
        arrays.set("G", &[1, 2], Value::Number(7.0)).unwrap();
        assert_eq!(arrays.get("G", &[1, 2]).unwrap(), Value::Number(7.0));
        assert_eq!(arrays.get("G", &[2, 3]).unwrap(), Value::Number(0.0));
        assert!(arrays.get("G", &[1, 4]).is_err());
        assert!(arrays.get("G", &[1]).is_err());
    }
}
