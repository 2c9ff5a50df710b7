//! Canonical text form of a namespace.

use std::fmt::{self, Display, Formatter};

use crate::member::Entry;
use crate::namespace::Namespace;

const INDENT: &str = "    ";

impl Namespace {
    /// Renders the namespace as an indented class listing.
    ///
    /// Members resolve while rendering; a member that fails shows its error
    /// message instead of a value. A computed member returning a namespace
    /// that is already being rendered shows its repr.
    ///
    /// ```
    /// use cabinet_registry::Registry;
    ///
    /// let registry = Registry::new();
    /// let main = registry.section("Main").member("DEBUG", false).build().unwrap();
    /// let config = registry
    ///     .hybrid("Config")
    ///     .member("HOST", "localhost")
    ///     .nested(main)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     config.render(),
    ///     "class Config:\n    HOST = 'localhost'\n    class Main:\n        DEBUG = False"
    /// );
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        let mut path = Vec::new();
        self.render_lines(&self.qualified_name(), 0, &mut path, &mut lines);
        lines.join("\n")
    }

    fn render_lines(
        &self,
        title: &str,
        depth: usize,
        path: &mut Vec<Namespace>,
        lines: &mut Vec<String>,
    ) {
        let indent = INDENT.repeat(depth);
        let body = INDENT.repeat(depth + 1);
        lines.push(format!("{indent}class {title}:"));
        if self.is_empty() {
            lines.push(format!("{body}..."));
            return;
        }

        path.push(self.clone());
        for name in self.keys() {
            match self.get_attr(name) {
                Ok(Entry::Namespace(nested)) if path.contains(&nested) => {
                    lines.push(format!("{body}{name} = {nested:?}"));
                }
                Ok(Entry::Namespace(nested)) => nested.render_lines(name, depth + 1, path, lines),
                Ok(Entry::Value(value)) => lines.push(format!("{body}{name} = {value}")),
                Err(err) => lines.push(format!("{body}{name} = {err}")),
            }
        }
        path.pop();
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use cabinet_primitives::{Deferred, EnvError, Error, Value};

    use crate::Registry;

    #[test]
    fn empty_namespace_renders_ellipsis() {
        let registry = Registry::new();
        let main = registry.section("Main").build().unwrap();
        assert_eq!(main.render(), "class Main:\n    ...");
        assert_eq!(main.to_string(), main.render());
    }

    #[test]
    fn nested_namespaces_indent() {
        let registry = Registry::new();
        let empty = registry.section("Empty").build().unwrap();
        let main = registry
            .section("Main")
            .member("HOSTS", vec![Value::from("a"), Value::from("b")])
            .nested(empty)
            .build()
            .unwrap();
        let config = registry.config("Config").nested(main.clone()).build().unwrap();

        assert_eq!(
            config.render(),
            [
                "class Config:",
                "    class Main:",
                "        HOSTS = ('a', 'b')",
                "        class Empty:",
                "            ...",
            ]
            .join("\n")
        );
        assert!(main.render().starts_with("class Config.Main:"));
    }

    #[test]
    fn failing_member_renders_error() {
        let registry = Registry::new();
        let missing: Deferred<Value> = Deferred::new("'HOST'", || {
            Err(Error::from(EnvError::MissingKey {
                name: "HOST".into(),
            }))
        });
        let main = registry
            .section("Main")
            .member("HOST", missing)
            .member("PORT", 80)
            .build()
            .unwrap();

        assert_eq!(
            main.render(),
            "class Main:\n    HOST = 'HOST' does not exist\n    PORT = 80"
        );
    }

    #[test]
    fn self_reference_does_not_loop() {
        let registry = Registry::new();
        let main = registry
            .section("Main")
            .computed("ME", |ns| Ok(ns.clone()))
            .build()
            .unwrap();
        assert_eq!(main.render(), "class Main:\n    ME = <Main>");
    }
}
