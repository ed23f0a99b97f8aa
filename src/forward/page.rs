//! HTML page shown by the dispatch variants.

use crate::forward::route::Route;

const TEMPLATE: &str = include_str!("../../templates/index.html");

const CAPTION: &str = "Powered by:";
const EKS_ICON: &str = "static/images/eks.png";
const LAMBDA_ICON: &str = "static/images/lambda.png";

/// Values substituted into the page template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub icon: &'static str,
    pub message: &'static str,
    pub aws_reg: String,
}

impl Page {
    /// Page for a value relayed from `route`.
    pub fn for_route(route: Route, aws_reg: String) -> Self {
        let icon = match route {
            Route::Lambda => LAMBDA_ICON,
            Route::Backend | Route::Passthrough => EKS_ICON,
        };
        Self {
            icon,
            message: CAPTION,
            aws_reg,
        }
    }

    pub fn render(&self) -> String {
        TEMPLATE
            .replace("{{ icon }}", &escape(self.icon))
            .replace("{{ message }}", &escape(self.message))
            .replace("{{ aws_reg }}", &escape(&self.aws_reg))
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
