//! Page templates, embedded at compile time from `web/templates`.

use std::sync::LazyLock;

use minijinja::{Environment, Error, ErrorKind};
use serde::Serialize;

use crate::assets::Templates;

static ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();

    for name in Templates::iter() {
        let Some(file) = Templates::get(&name) else {
            continue;
        };
        let source = String::from_utf8_lossy(&file.data).into_owned();
        if let Err(e) = env.add_template_owned(name.to_string(), source) {
            tracing::error!(template = %name, error = %e, "failed to load template");
        }
    }

    env
});

pub fn render_template<T: Serialize>(name: &str, ctx: T) -> Result<String, Error> {
    let tpl = ENV.get_template(name)?;
    tpl.render(ctx)
}

/// Serializes a value as JSON that is safe to inline in a `<script>` element.
pub fn inline_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let s = serde_json::to_string(value).map_err(|err| {
        Error::new(ErrorKind::InvalidOperation, "cannot serialize to JSON").with_source(err)
    })?;

    let mut rv = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => rv.push_str("\\u003c"),
            '>' => rv.push_str("\\u003e"),
            '&' => rv.push_str("\\u0026"),
            '\'' => rv.push_str("\\u0027"),
            _ => rv.push(c),
        }
    }
    Ok(rv)
}
