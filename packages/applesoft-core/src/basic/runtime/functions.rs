//! DEF FN storage.

use std::collections::HashMap;

use super::super::ast::Expr;
use super::vars::canonical_name;

#[derive(Debug, Clone)]
pub struct UserFunction {
    pub param: String,
    pub body: Expr,
}

/// User functions, keyed by the same two-character canonical names as
/// variables (FN SQUARE and FN SQUALL collide, exactly like the ROM).
#[derive(Default)]
pub struct FunctionManager {
    functions: HashMap<String, UserFunction>,
}

impl FunctionManager {
    pub fn new() -> FunctionManager {
        FunctionManager::default()
    }

    /// DEF FN: a redefinition silently replaces the old body.
    pub fn define(&mut self, name: &str, param: String, body: Expr) {
        self.functions
            .insert(canonical_name(name), UserFunction { param, body });
    }

    pub fn lookup(&self, name: &str) -> Option<&UserFunction> {
        self.functions.get(&canonical_name(name))
    }

    pub fn clear(&mut self) {
        self.functions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_alias_like_variables() {
        let mut functions = FunctionManager::new();
        functions.define("SQUARE", "X".into(), Expr::Number(1.0));
        assert!(functions.lookup("SQUALL").is_some());
        assert!(functions.lookup("CUBE").is_none());
    }

    #[test]
    fn redefinition_replaces() {
        let mut functions = FunctionManager::new();
        functions.define("F", "X".into(), Expr::Number(1.0));
        functions.define("F", "Y".into(), Expr::Number(2.0));
        assert_eq!(functions.lookup("F").unwrap().param, "Y");
    }
}
