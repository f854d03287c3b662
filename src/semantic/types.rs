use crate::errors::{CompileError, CompileResult};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

pub const BOOL: &str = "bool";
pub const INT: &str = "int";
pub const UINT: &str = "uint";
pub const FLOAT: &str = "float";
pub const STR: &str = "str";
/// Type of schema-less values. Only built-ins have it.
pub const JSON: &str = "json";

/// The conversion lattice: a directed graph over type names where an edge
/// `a -> b` means a value of `a` converts to `b` without loss.
#[derive(Debug, Clone)]
pub struct TypeEnv {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl Default for TypeEnv {
    fn default() -> Self {
        let mut env = Self {
            edges: BTreeMap::new(),
        };

        env.add_path(&[BOOL, UINT, INT, FLOAT]);
        env.add_path(&["i8", "i16", "i32", "i64", INT]);
        env.add_path(&["u8", "u16", "u32", "u64", UINT]);
        env.add_path(&["f32", "f64", FLOAT]);
        env.add_type(STR);
        env
    }
}

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds edges between consecutive types of `path`, narrowest first.
    pub fn add_path(&mut self, path: &[&str]) {
        for ty in path {
            self.add_type(ty);
        }
        for pair in path.windows(2) {
            if let Some(targets) = self.edges.get_mut(pair[0]) {
                targets.insert(pair[1].to_string());
            }
        }
    }

    /// Adds a type which converts only to itself.
    pub fn add_type(&mut self, name: &str) {
        self.edges.entry(name.to_string()).or_default();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> + '_ {
        self.edges.keys().map(String::as_str)
    }

    /// Every type `name` converts to, with the length of the shortest path.
    fn targets<'e>(&'e self, name: &str) -> BTreeMap<&'e str, usize> {
        let mut distances = BTreeMap::new();
        let mut queue = VecDeque::new();

        if let Some((start, _)) = self.edges.get_key_value(name) {
            distances.insert(start.as_str(), 0);
            queue.push_back(start.as_str());
        }

        while let Some(ty) = queue.pop_front() {
            let distance = distances[ty];

            for next in &self.edges[ty] {
                if !distances.contains_key(next.as_str()) {
                    distances.insert(next.as_str(), distance + 1);
                    queue.push_back(next.as_str());
                }
            }
        }

        distances
    }

    pub fn is_convertible(&self, from: &str, to: &str) -> bool {
        from == to || self.targets(from).contains_key(to)
    }

    /// The nearest type both `type1` and `type2` convert to. Ties are broken
    /// by name so the result does not depend on argument order.
    pub fn lub(&self, type1: &str, type2: &str) -> Option<&str> {
        if !self.contains(type1) || !self.contains(type2) {
            return None;
        }

        let targets1 = self.targets(type1);
        let targets2 = self.targets(type2);

        targets1
            .iter()
            .filter_map(|(ty, d1)| targets2.get(ty).map(|d2| (d1 + d2, *ty)))
            .min()
            .map(|(_, ty)| ty)
    }

    pub fn check_type_ref(&self, name: &str) -> CompileResult<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(CompileError::type_error(format!("Unknown type {}", name)))
        }
    }

    fn expect_convertible(&self, op: &str, ty: &str, target: &str) -> CompileResult<()> {
        if self.is_convertible(ty, target) {
            Ok(())
        } else {
            Err(CompileError::type_error(format!(
                "Binary `{}` not supported for type {}",
                op, ty
            )))
        }
    }

    pub fn check_unary(&self, op: &str, arg_type: &str) -> CompileResult<String> {
        let rtype = match op {
            "-" | "not" => {
                if !self.is_convertible(arg_type, FLOAT) {
                    return Err(CompileError::type_error(format!(
                        "Unary `{}` not supported for type {}",
                        op, arg_type
                    )));
                }

                if op == "not" {
                    BOOL
                } else if self.is_convertible(arg_type, INT) {
                    INT
                } else {
                    FLOAT
                }
            }
            _ => {
                return Err(CompileError::internal(format!(
                    "Unexpected unary operator: {}",
                    op
                )))
            }
        };

        debug!("[types] {} {} : {}", op, arg_type, rtype);
        Ok(rtype.to_string())
    }

    pub fn check_binary(&self, op: &str, type1: &str, type2: &str) -> CompileResult<String> {
        let rtype = match op {
            "and" | "or" | "<" | "<=" | ">" | ">=" => {
                self.expect_convertible(op, type1, FLOAT)?;
                self.expect_convertible(op, type2, FLOAT)?;
                BOOL
            }
            "==" | "!=" => {
                if type1 != type2 {
                    self.expect_convertible(op, type1, FLOAT)?;
                    self.expect_convertible(op, type2, FLOAT)?;
                }
                BOOL
            }
            "+" | "-" | "*" | "/" => {
                self.expect_convertible(op, type1, FLOAT)?;
                self.expect_convertible(op, type2, FLOAT)?;
                self.arithmetic_type(op, type1, type2)?
            }
            "%" => {
                self.expect_convertible(op, type1, INT)?;
                self.expect_convertible(op, type2, INT)?;
                self.arithmetic_type(op, type1, type2)?
            }
            "**" => {
                self.expect_convertible(op, type1, FLOAT)?;
                self.expect_convertible(op, type2, FLOAT)?;
                FLOAT
            }
            _ => {
                return Err(CompileError::internal(format!(
                    "Unexpected binary operator: {}",
                    op
                )))
            }
        };

        debug!("[types] {} {} {} : {}", type1, op, type2, rtype);
        Ok(rtype.to_string())
    }

    fn arithmetic_type(&self, op: &str, type1: &str, type2: &str) -> CompileResult<&str> {
        // Both operands were checked to convert to a common type already.
        self.lub(type1, type2).ok_or_else(|| {
            CompileError::internal(format!(
                "no common type for {} `{}` {}",
                type1, op, type2
            ))
        })
    }

    pub fn check_assign(&self, ltype: &str, rtype: &str) -> CompileResult<()> {
        if self.is_convertible(rtype, ltype) {
            Ok(())
        } else {
            Err(CompileError::type_error(format!(
                "Can't assign expression of type {} to variable of type {}",
                rtype, ltype
            )))
        }
    }

    pub fn check_update(&self, op: &str, ltype: &str, rtype: &str) -> CompileResult<()> {
        match op {
            "+=" | "-=" | "*=" | "/=" => {
                self.expect_convertible(op, ltype, FLOAT)?;
                self.expect_convertible(op, rtype, FLOAT)?;
            }
            _ => {
                return Err(CompileError::internal(format!(
                    "Unexpected update operator: {}",
                    op
                )))
            }
        }

        self.check_assign(ltype, rtype)
    }

    pub fn check_condition(&self, ty: &str) -> CompileResult<()> {
        if self.is_convertible(ty, FLOAT) {
            Ok(())
        } else {
            Err(CompileError::type_error(format!(
                "condition type not boolean or numeric: {}",
                ty
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CodeError, CodeErrorKind};
    use assert_matches::assert_matches;

    fn assert_type_error<T: std::fmt::Debug>(result: CompileResult<T>) {
        assert_matches!(
            result,
            Err(CompileError::Code(CodeError {
                kind: CodeErrorKind::Type,
                ..
            }))
        );
    }

    #[test]
    fn convertible_is_reflexive() {
        let env = TypeEnv::new();

        for ty in env.types() {
            assert!(env.is_convertible(ty, ty), "{}", ty);
        }
    }

    #[test]
    fn convertible_is_transitive() {
        let env = TypeEnv::new();
        let types: Vec<_> = env.types().collect();

        for a in &types {
            for b in &types {
                for c in &types {
                    if env.is_convertible(a, b) && env.is_convertible(b, c) {
                        assert!(env.is_convertible(a, c), "{} -> {} -> {}", a, b, c);
                    }
                }
            }
        }
    }

    #[test]
    fn widening_only() {
        let env = TypeEnv::new();

        assert!(env.is_convertible("u8", FLOAT));
        assert!(env.is_convertible(BOOL, INT));
        assert!(env.is_convertible("i32", "i64"));
        assert!(!env.is_convertible(FLOAT, INT));
        assert!(!env.is_convertible(INT, UINT));
        assert!(!env.is_convertible(STR, FLOAT));
        assert!(!env.is_convertible("vec3", FLOAT));
    }

    #[test]
    fn lub_is_symmetric() {
        let env = TypeEnv::new();
        let types: Vec<_> = env.types().collect();

        for a in &types {
            for b in &types {
                assert_eq!(env.lub(a, b), env.lub(b, a), "{} {}", a, b);
            }
        }
    }

    #[test]
    fn lub_picks_nearest_common_type() {
        let env = TypeEnv::new();

        assert_eq!(env.lub("i8", "i32"), Some("i32"));
        assert_eq!(env.lub("u8", "i8"), Some(INT));
        assert_eq!(env.lub(BOOL, "u16"), Some(UINT));
        assert_eq!(env.lub("f32", INT), Some(FLOAT));
        assert_eq!(env.lub(INT, INT), Some(INT));
        assert_eq!(env.lub(STR, INT), None);
        assert_eq!(env.lub("vec3", INT), None);
    }

    #[test]
    fn unary_minus() {
        let env = TypeEnv::new();

        assert_eq!(env.check_unary("-", "u8").unwrap(), INT);
        assert_eq!(env.check_unary("-", BOOL).unwrap(), INT);
        assert_eq!(env.check_unary("-", "f32").unwrap(), FLOAT);
        assert_type_error(env.check_unary("-", STR));
    }

    #[test]
    fn unary_not() {
        let env = TypeEnv::new();

        assert_eq!(env.check_unary("not", FLOAT).unwrap(), BOOL);
        assert_type_error(env.check_unary("not", STR));
        assert!(env.check_unary("~", INT).unwrap_err().is_internal());
    }

    #[test]
    fn arithmetic() {
        let env = TypeEnv::new();

        assert_eq!(env.check_binary("+", "i8", "i16").unwrap(), "i16");
        assert_eq!(env.check_binary("*", INT, FLOAT).unwrap(), FLOAT);
        assert_eq!(env.check_binary("%", "u8", "i8").unwrap(), INT);
        assert_eq!(env.check_binary("**", INT, INT).unwrap(), FLOAT);
        assert_type_error(env.check_binary("%", FLOAT, INT));
        assert_type_error(env.check_binary("+", STR, STR));
    }

    #[test]
    fn comparison() {
        let env = TypeEnv::new();

        assert_eq!(env.check_binary("==", STR, STR).unwrap(), BOOL);
        assert_eq!(env.check_binary("!=", INT, FLOAT).unwrap(), BOOL);
        assert_eq!(env.check_binary("<", "u8", FLOAT).unwrap(), BOOL);
        assert_eq!(env.check_binary("and", BOOL, INT).unwrap(), BOOL);
        assert_type_error(env.check_binary("==", STR, INT));
        assert_type_error(env.check_binary("<", STR, STR));
        assert!(env.check_binary("<<", INT, INT).unwrap_err().is_internal());
    }

    #[test]
    fn assignment_and_update() {
        let env = TypeEnv::new();

        env.check_assign(FLOAT, INT).unwrap();
        assert_type_error(env.check_assign(INT, FLOAT));
        env.check_update("+=", FLOAT, INT).unwrap();
        assert_type_error(env.check_update("-=", INT, FLOAT));
        assert_type_error(env.check_update("+=", STR, STR));
        assert!(env.check_update("%=", INT, INT).unwrap_err().is_internal());
    }

    #[test]
    fn conditions() {
        let env = TypeEnv::new();

        env.check_condition(BOOL).unwrap();
        env.check_condition("u32").unwrap();
        assert_type_error(env.check_condition(STR));
    }

    #[test]
    fn enum_types_are_isolated() {
        let mut env = TypeEnv::new();

        env.add_type("Cell");
        env.check_type_ref("Cell").unwrap();
        assert!(env.is_convertible("Cell", "Cell"));
        assert!(!env.is_convertible("Cell", FLOAT));
        assert_eq!(env.check_binary("==", "Cell", "Cell").unwrap(), BOOL);
        assert_type_error(env.check_type_ref("vec3"));
    }
}
