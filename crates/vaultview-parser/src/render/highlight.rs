//! Syntax highlighting for fenced code with a declared language.
//!
//! Output is class-based (`<span class="hl-keyword">`) so themes live in CSS.

use super::html::HtmlNode;
use std::sync::LazyLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use vaultview_core::{Error, Result};

/// Class prefix on highlighter spans
pub const CLASS_PREFIX: &str = "hl-";

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Highlight `code` as `lang`.
///
/// Returns `Ok(None)` when the language is unknown; the block is then left
/// as plain escaped text.
pub fn highlight(code: &str, lang: &str) -> Result<Option<String>> {
    let Some(syntax) = SYNTAXES.find_syntax_by_token(lang) else {
        return Ok(None);
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        &SYNTAXES,
        ClassStyle::SpacedPrefixed {
            prefix: CLASS_PREFIX,
        },
    );
    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|e| Error::render_error(format!("highlighting {} failed: {}", lang, e)))?;
    }
    Ok(Some(generator.finalize()))
}

/// Highlight every `pre > code.language-*` in the tree, marking it `hljs`
pub fn highlight_code_blocks(nodes: &mut [HtmlNode]) -> Result<()> {
    for node in nodes.iter_mut() {
        let Some(el) = node.as_element_mut() else {
            continue;
        };

        if el.tag == "pre" {
            for child in el.children.iter_mut() {
                let Some(code) = child.as_element_mut() else {
                    continue;
                };
                if code.tag != "code" {
                    continue;
                }
                let Some(lang) = code.class_with_prefix("language-").map(str::to_string) else {
                    continue;
                };
                let text = code.text_content();
                if let Some(html) = highlight(&text, &lang)? {
                    code.children = vec![HtmlNode::Highlighted { html, text }];
                    code.add_class("hljs");
                }
            }
        } else {
            highlight_code_blocks(&mut el.children)?;
        }
    }
    Ok(())
}
