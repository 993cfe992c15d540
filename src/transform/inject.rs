//! Style injection codegen
//!
//! Turns a stylesheet into a plain statement that adds a `<style>` element to
//! the document when the chunk executes.

use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::error::BuildWarning;
use crate::plugins::PluginContext;

/// Label passed to `console.error` when a style fails to attach at runtime
const RUNTIME_ERROR_LABEL: &str = "style-injected-by-js";

/// Caller-supplied transform applied to each stylesheet right before injection.
///
/// Returning `Ok(None)`, an empty string or an error keeps the stylesheet
/// as it was.
#[async_trait]
pub trait CssHook: Send + Sync {
    async fn transform(&self, css: String) -> Result<Option<String>>;
}

#[async_trait]
impl<F, Fut> CssHook for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
    async fn transform(&self, css: String) -> Result<Option<String>> {
        (self)(css).await
    }
}

/// Run the hook on a compressed stylesheet, keeping `css` when it misbehaves
pub async fn apply_css_hook(
    hook: &dyn CssHook,
    filename: &str,
    css: String,
    ctx: &PluginContext,
) -> String {
    let warning = match hook.transform(css.clone()).await {
        Ok(Some(transformed)) if !transformed.is_empty() => return transformed,
        Ok(_) => BuildWarning::EmptyHookResult {
            filename: filename.to_string(),
        },
        Err(err) => BuildWarning::HookFailed {
            filename: filename.to_string(),
            reason: format!("{:#}", err),
        },
    };

    warn!("{}", warning);
    ctx.warn(warning);
    css
}

/// Statement that appends `css` to `document.head` inside a `<style>` element.
///
/// Runtime failures are caught and logged so the chunk itself still runs.
/// The statement ends with a separator and can precede any code.
pub fn style_bootstrap(css: &str) -> String {
    let literal = serde_json::Value::String(css.trim().to_string()).to_string();

    format!(
        "(function(){{try{{var elementStyle=document.createElement('style');\
elementStyle.appendChild(document.createTextNode({}));\
document.head.appendChild(elementStyle);}}\
catch(e){{console.error('{}',e);}}}})();\n",
        literal, RUNTIME_ERROR_LABEL
    )
}

/// Prepend the style bootstrap for `css` to `code`
pub fn inject_style(code: &str, css: &str) -> String {
    let mut injected = style_bootstrap(css);
    injected.push_str(code);
    injected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_escapes_css() {
        let bootstrap = style_bootstrap("  a::after{content:\"</style>\\\"\"}\n");

        assert!(bootstrap.starts_with("(function(){try{"));
        assert!(bootstrap.contains(r#"document.createTextNode("a::after{content:\"</style>\\\"\"}")"#));
        assert!(bootstrap.contains("console.error('style-injected-by-js',e)"));
        assert!(bootstrap.ends_with("})();\n"));
    }

    #[test]
    fn test_inject_style_keeps_original_code() {
        let code = "import{a}from'./a.js';a();";
        let injected = inject_style(code, ".a{color:red}");

        assert_eq!(injected, format!("{}{}", style_bootstrap(".a{color:red}"), code));
    }

    #[tokio::test]
    async fn test_hook_transforms_css() {
        let ctx = PluginContext::new();
        let hook = |css: String| async move { Ok::<_, anyhow::Error>(Some(format!("/*x*/{}", css))) };

        let css = apply_css_hook(&hook, "a.css", ".a{}".to_string(), &ctx).await;

        assert_eq!(css, "/*x*/.a{}");
        assert!(ctx.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_empty_hook_result_falls_back() {
        let ctx = PluginContext::new();
        let empty = |_css: String| async move { Ok::<_, anyhow::Error>(Some(String::new())) };
        let missing = |_css: String| async move { Ok::<_, anyhow::Error>(None) };

        assert_eq!(apply_css_hook(&empty, "a.css", ".a{}".to_string(), &ctx).await, ".a{}");
        assert_eq!(apply_css_hook(&missing, "b.css", ".b{}".to_string(), &ctx).await, ".b{}");
        assert_eq!(
            ctx.warnings(),
            vec![
                BuildWarning::EmptyHookResult {
                    filename: "a.css".to_string()
                },
                BuildWarning::EmptyHookResult {
                    filename: "b.css".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_hook_falls_back() {
        let ctx = PluginContext::new();
        let failing =
            |_css: String| async move { Err::<Option<String>, _>(anyhow::anyhow!("boom")) };

        let css = apply_css_hook(&failing, "a.css", ".a{}".to_string(), &ctx).await;

        assert_eq!(css, ".a{}");
        assert_eq!(
            ctx.warnings(),
            vec![BuildWarning::HookFailed {
                filename: "a.css".to_string(),
                reason: "boom".to_string(),
            }]
        );
    }
}
