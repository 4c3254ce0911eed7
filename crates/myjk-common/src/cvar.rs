// cvar.rs — dynamic variable tracking
// Converted from: myjk-original/codemp/qcommon/cvar.c

use std::collections::HashMap;

use crate::common::com_printf;

/// A console variable.
#[derive(Clone)]
pub struct Cvar {
    pub name: String,
    pub string: String,
    pub flags: i32,
    /// Set each time the cvar is changed, cleared by the module update cycle.
    pub modified: bool,
    pub value: f32,
    pub integer: i32,
}

/// The full cvar system context.
pub struct CvarContext {
    pub cvar_vars: Vec<Cvar>,
    /// O(1) cvar lookup by name -> index in cvar_vars
    cvar_index: HashMap<String, usize>,
}

impl Default for CvarContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CvarContext {
    pub fn new() -> Self {
        Self {
            cvar_vars: Vec::new(),
            cvar_index: HashMap::new(),
        }
    }

    /// Find a cvar by name, returning its index. O(1) via HashMap.
    pub fn find_var_index(&self, name: &str) -> Option<usize> {
        self.cvar_index.get(name).copied()
    }

    /// Find a cvar by name.
    pub fn find_var(&self, name: &str) -> Option<&Cvar> {
        self.cvar_index.get(name).map(|&idx| &self.cvar_vars[idx])
    }

    /// Find a cvar by name (mutable).
    pub fn find_var_mut(&mut self, name: &str) -> Option<&mut Cvar> {
        if let Some(&idx) = self.cvar_index.get(name) {
            Some(&mut self.cvar_vars[idx])
        } else {
            None
        }
    }

    /// Get the floating-point value of a cvar. Returns 0 if not found.
    pub fn variable_value(&self, name: &str) -> f32 {
        match self.find_var(name) {
            Some(var) => var.value,
            None => 0.0,
        }
    }

    /// Get the integer value of a cvar. Returns 0 if not found.
    pub fn variable_integer(&self, name: &str) -> i32 {
        match self.find_var(name) {
            Some(var) => var.integer,
            None => 0,
        }
    }

    /// Get the string value of a cvar. Returns "" if not found.
    pub fn variable_string(&self, name: &str) -> &str {
        match self.find_var(name) {
            Some(var) => &var.string,
            None => "",
        }
    }

    /// Get or create a cvar. If it already exists, the value is not changed
    /// but flags are OR'd in.
    pub fn get(&mut self, name: &str, value: &str, flags: i32) -> Option<usize> {
        if name.is_empty() {
            com_printf("invalid cvar name\n");
            return None;
        }

        if let Some(&idx) = self.cvar_index.get(name) {
            self.cvar_vars[idx].flags |= flags;
            return Some(idx);
        }

        let float_val = value.parse::<f32>().unwrap_or(0.0);
        let idx = self.cvar_vars.len();
        self.cvar_vars.push(Cvar {
            name: name.to_string(),
            string: value.to_string(),
            flags,
            // force an initial update in every module that mirrors it
            modified: true,
            value: float_val,
            integer: float_val as i32,
        });
        self.cvar_index.insert(name.to_string(), idx);
        Some(idx)
    }

    /// Set a cvar from a string, creating it if it does not exist.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(var) = self.find_var_mut(name) {
            if var.string == value {
                return;
            }
            var.string = value.to_string();
            var.value = value.parse::<f32>().unwrap_or(0.0);
            var.integer = var.value as i32;
            var.modified = true;
        } else {
            self.get(name, value, 0);
        }
    }

    /// Set a cvar from a float.
    pub fn set_value(&mut self, name: &str, value: f32) {
        // integers print without a trailing .0, matching the C %f / %i split
        let s = if value == value as i32 as f32 {
            format!("{}", value as i32)
        } else {
            format!("{}", value)
        };
        self.set(name, &s);
    }
}

// ============================================================
// Unit tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_registers_default() {
        let mut ctx = CvarContext::new();
        ctx.get("cg_test", "3", 0);
        assert_eq!(ctx.variable_integer("cg_test"), 3);
        assert_eq!(ctx.variable_value("cg_test"), 3.0);
        assert_eq!(ctx.variable_string("cg_test"), "3");
    }

    #[test]
    fn test_reget_keeps_value_ors_flags() {
        let mut ctx = CvarContext::new();
        ctx.get("cg_test", "3", 1);
        ctx.set("cg_test", "7");
        ctx.get("cg_test", "3", 2);
        let var = ctx.find_var("cg_test").unwrap();
        assert_eq!(var.integer, 7);
        assert_eq!(var.flags, 3);
    }

    #[test]
    fn test_set_updates_value_and_modified() {
        let mut ctx = CvarContext::new();
        ctx.get("cg_fps", "30", 0);
        ctx.find_var_mut("cg_fps").unwrap().modified = false;

        ctx.set("cg_fps", "60");
        let var = ctx.find_var("cg_fps").unwrap();
        assert_eq!(var.integer, 60);
        assert!(var.modified);

        // setting to the same string does not re-flag
        ctx.find_var_mut("cg_fps").unwrap().modified = false;
        ctx.set("cg_fps", "60");
        assert!(!ctx.find_var("cg_fps").unwrap().modified);
    }

    #[test]
    fn test_float_strings_truncate_to_integer() {
        let mut ctx = CvarContext::new();
        ctx.get("cg_radius", "2.5", 0);
        assert_eq!(ctx.variable_value("cg_radius"), 2.5);
        assert_eq!(ctx.variable_integer("cg_radius"), 2);
    }

    #[test]
    fn test_missing_cvar_reads_zero() {
        let ctx = CvarContext::new();
        assert_eq!(ctx.variable_value("nope"), 0.0);
        assert_eq!(ctx.variable_integer("nope"), 0);
        assert_eq!(ctx.variable_string("nope"), "");
    }

    #[test]
    fn test_set_value_formats_integers() {
        let mut ctx = CvarContext::new();
        ctx.set_value("cg_x", 4.0);
        assert_eq!(ctx.variable_string("cg_x"), "4");
        ctx.set_value("cg_x", 4.5);
        assert_eq!(ctx.variable_string("cg_x"), "4.5");
    }
}
