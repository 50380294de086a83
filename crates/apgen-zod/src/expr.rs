//! The Zod expression tree. Schemas are assembled as structured expressions
//! and rendered to source only when a declaration is appended to a file.

use std::fmt;

use serde_json::Value;

/// An expression in the Zod vocabulary.
#[derive(Debug, Clone)]
pub enum ZodExpr {
    /// A bare identifier, usually a previously emitted schema constant.
    Ident(String),
    /// A call rooted at the library namespace: `z.object(…)`,
    /// `z.coerce.bigint()`.
    Call {
        path: Vec<String>,
        args: Vec<ZodExpr>,
    },
    /// A chained method call: `expr.min(1)`.
    Chain {
        recv: Box<ZodExpr>,
        method: String,
        args: Vec<ZodExpr>,
    },
    /// A thunk: `() => expr`.
    Arrow(Box<ZodExpr>),
    /// An object literal with pre-sanitized keys.
    Object(Vec<(String, ZodExpr)>),
    /// An array literal.
    Array(Vec<ZodExpr>),
    /// A JSON-derived literal rendered as JavaScript source.
    Literal(Value),
    /// A verbatim source fragment (bigint constants, regex literals).
    Raw(String),
}

impl ZodExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        ZodExpr::Ident(name.into())
    }

    /// `z.<name>(args)`.
    pub fn call(name: &str, args: Vec<ZodExpr>) -> Self {
        ZodExpr::Call {
            path: vec!["z".to_string(), name.to_string()],
            args,
        }
    }

    /// `z.<name>()`.
    pub fn call0(name: &str) -> Self {
        ZodExpr::call(name, Vec::new())
    }

    /// `z.coerce.<name>()`.
    pub fn coerce(name: &str) -> Self {
        ZodExpr::Call {
            path: vec!["z".to_string(), "coerce".to_string(), name.to_string()],
            args: Vec::new(),
        }
    }

    /// `z.lazy(() => <name>)`.
    pub fn lazy(name: &str) -> Self {
        ZodExpr::call("lazy", vec![ZodExpr::Arrow(Box::new(ZodExpr::ident(name)))])
    }

    /// `z.literal(<value>)`.
    pub fn literal(value: Value) -> Self {
        ZodExpr::call("literal", vec![ZodExpr::Literal(value)])
    }

    /// `<self>.<method>(args)`.
    pub fn chain(self, method: &str, args: Vec<ZodExpr>) -> Self {
        ZodExpr::Chain {
            recv: Box::new(self),
            method: method.to_string(),
            args,
        }
    }

    /// `<self>.<method>()`.
    pub fn chain0(self, method: &str) -> Self {
        self.chain(method, Vec::new())
    }
}

impl fmt::Display for ZodExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZodExpr::Ident(name) => f.write_str(name),
            ZodExpr::Call { path, args } => {
                write!(f, "{}(", path.join("."))?;
                write_args(f, args)?;
                f.write_str(")")
            }
            ZodExpr::Chain { recv, method, args } => {
                write!(f, "{recv}.{method}(")?;
                write_args(f, args)?;
                f.write_str(")")
            }
            ZodExpr::Arrow(inner) => write!(f, "() => {inner}"),
            ZodExpr::Object(entries) => {
                if entries.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str(" }")
            }
            ZodExpr::Array(items) => {
                f.write_str("[")?;
                write_args(f, items)?;
                f.write_str("]")
            }
            // JSON literals are valid JavaScript literals.
            ZodExpr::Literal(value) => match serde_json::to_string(value) {
                Ok(rendered) => f.write_str(&rendered),
                Err(_) => f.write_str("undefined"),
            },
            ZodExpr::Raw(source) => f.write_str(source),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[ZodExpr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_call_chain() {
        let expr = ZodExpr::call0("string")
            .chain("min", vec![ZodExpr::Literal(json!(1))])
            .chain0("optional");
        assert_eq!(expr.to_string(), "z.string().min(1).optional()");
    }

    #[test]
    fn renders_object_literal() {
        let expr = ZodExpr::call(
            "object",
            vec![ZodExpr::Object(vec![
                ("id".to_string(), ZodExpr::coerce("bigint")),
                ("name".to_string(), ZodExpr::call0("string")),
            ])],
        );
        assert_eq!(
            expr.to_string(),
            "z.object({ id: z.coerce.bigint(), name: z.string() })"
        );
    }

    #[test]
    fn renders_lazy_thunk() {
        assert_eq!(ZodExpr::lazy("Pet").to_string(), "z.lazy(() => Pet)");
    }

    #[test]
    fn renders_string_literals_quoted() {
        let expr = ZodExpr::call(
            "enum",
            vec![ZodExpr::Array(vec![
                ZodExpr::Literal(json!("red")),
                ZodExpr::Literal(json!("green")),
            ])],
        );
        assert_eq!(expr.to_string(), "z.enum([\"red\", \"green\"])");
    }
}
