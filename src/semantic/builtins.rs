use super::types::{FLOAT, JSON};

/// A function provided by the runtime.
#[derive(Debug, PartialEq, Eq)]
pub struct BuiltinFunc {
    pub name: &'static str,
    pub ptypes: &'static [&'static str],
    pub rtype: &'static str,
}

impl BuiltinFunc {
    /// e.g. `(float, float) -> float`
    pub fn signature(&self) -> String {
        signature(self.ptypes.iter().copied(), Some(self.rtype))
    }
}

/// A value provided by the runtime.
#[derive(Debug, PartialEq, Eq)]
pub struct BuiltinConst {
    pub name: &'static str,
    pub r#type: &'static str,
}

const UNARY: &[&str] = &[FLOAT];
const BINARY: &[&str] = &[FLOAT, FLOAT];

pub static BUILTIN_FUNCS: &[BuiltinFunc] = &[
    BuiltinFunc { name: "sqrt", ptypes: UNARY, rtype: FLOAT },
    BuiltinFunc { name: "exp", ptypes: UNARY, rtype: FLOAT },
    BuiltinFunc { name: "log", ptypes: UNARY, rtype: FLOAT },
    BuiltinFunc { name: "sin", ptypes: UNARY, rtype: FLOAT },
    BuiltinFunc { name: "cos", ptypes: UNARY, rtype: FLOAT },
    BuiltinFunc { name: "tan", ptypes: UNARY, rtype: FLOAT },
    BuiltinFunc { name: "abs", ptypes: UNARY, rtype: FLOAT },
    BuiltinFunc { name: "floor", ptypes: UNARY, rtype: FLOAT },
    BuiltinFunc { name: "ceil", ptypes: UNARY, rtype: FLOAT },
    BuiltinFunc { name: "min", ptypes: BINARY, rtype: FLOAT },
    BuiltinFunc { name: "max", ptypes: BINARY, rtype: FLOAT },
    BuiltinFunc { name: "pow", ptypes: BINARY, rtype: FLOAT },
];

pub static BUILTIN_CONSTS: &[BuiltinConst] = &[BuiltinConst { name: "CONFIG", r#type: JSON }];

/// Renders a function type. Functions without a return type return `void`.
pub fn signature<'s, I>(ptypes: I, rtype: Option<&str>) -> String
where
    I: IntoIterator<Item = &'s str>,
{
    let ptypes: Vec<_> = ptypes.into_iter().collect();
    format!("({}) -> {}", ptypes.join(", "), rtype.unwrap_or("void"))
}
