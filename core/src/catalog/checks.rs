use crate::context::{Provenance, ValidationContext};
use crate::manifest::icons::read_icons;
use crate::manifest::{Field, ManifestDocument};
use crate::rules::Outcome;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

/// Parameterized rule shapes a catalog entry can select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckSpec {
    ManifestPresent,
    NonEmptyString {
        field: String,
    },
    AnyNonEmptyString {
        fields: Vec<String>,
    },
    MaxLength {
        field: String,
        max: usize,
    },
    OneOf {
        field: String,
        values: Vec<String>,
    },
    Color {
        field: String,
    },
    Url {
        field: String,
        #[serde(default)]
        same_origin: bool,
    },
    NonEmptyArray {
        field: String,
    },
    StringArray {
        field: String,
    },
    Object {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        required_key: Option<String>,
    },
    Boolean {
        field: String,
    },
    IconMinSize {
        min: u32,
    },
    IconPurpose {
        purpose: String,
    },
    StartUrlInScope,
    ServiceWorkerPresent,
    ServiceWorkerScope,
    ServiceWorkerScript,
    ServiceWorkerControlsStartUrl,
    SiteHttps,
    ManifestHttps,
    ManifestSameOrigin,
}

impl CheckSpec {
    /// Field-level checks need a manifest; the site/service-worker ones do not.
    pub fn inspects_manifest(&self) -> bool {
        !matches!(
            self,
            CheckSpec::ServiceWorkerPresent
                | CheckSpec::ServiceWorkerScope
                | CheckSpec::ServiceWorkerScript
                | CheckSpec::SiteHttps
                | CheckSpec::ManifestHttps
                | CheckSpec::ManifestSameOrigin
        )
    }

    pub fn evaluate(&self, ctx: &ValidationContext) -> Outcome {
        match self {
            CheckSpec::ManifestPresent => manifest_present(ctx),
            CheckSpec::NonEmptyString { field } => {
                with_manifest(ctx, |m| non_empty_string(ctx, m, field))
            }
            CheckSpec::AnyNonEmptyString { fields } => {
                with_manifest(ctx, |m| any_non_empty_string(ctx, m, fields))
            }
            CheckSpec::MaxLength { field, max } => {
                with_manifest(ctx, |m| max_length(ctx, m, field, *max))
            }
            CheckSpec::OneOf { field, values } => {
                with_manifest(ctx, |m| one_of(ctx, m, field, values))
            }
            CheckSpec::Color { field } => with_manifest(ctx, |m| color(ctx, m, field)),
            CheckSpec::Url { field, same_origin } => {
                with_manifest(ctx, |m| url_member(ctx, m, field, *same_origin))
            }
            CheckSpec::NonEmptyArray { field } => {
                with_manifest(ctx, |m| non_empty_array(ctx, m, field))
            }
            CheckSpec::StringArray { field } => with_manifest(ctx, |m| string_array(ctx, m, field)),
            CheckSpec::Object {
                field,
                required_key,
            } => with_manifest(ctx, |m| object(ctx, m, field, required_key.as_deref())),
            CheckSpec::Boolean { field } => with_manifest(ctx, |m| boolean(ctx, m, field)),
            CheckSpec::IconMinSize { min } => with_manifest(ctx, |m| icon_min_size(ctx, m, *min)),
            CheckSpec::IconPurpose { purpose } => {
                with_manifest(ctx, |m| icon_purpose(ctx, m, purpose))
            }
            CheckSpec::StartUrlInScope => with_manifest(ctx, |m| start_url_in_scope(ctx, m)),
            CheckSpec::ServiceWorkerPresent => service_worker_present(ctx),
            CheckSpec::ServiceWorkerScope => service_worker_scope(ctx),
            CheckSpec::ServiceWorkerScript => service_worker_script(ctx),
            CheckSpec::ServiceWorkerControlsStartUrl => service_worker_controls_start_url(ctx),
            CheckSpec::SiteHttps => site_https(ctx),
            CheckSpec::ManifestHttps => manifest_https(ctx),
            CheckSpec::ManifestSameOrigin => manifest_same_origin(ctx),
        }
    }
}

fn with_manifest<F>(ctx: &ValidationContext, f: F) -> Outcome
where
    F: FnOnce(&ManifestDocument) -> Outcome,
{
    match &ctx.manifest {
        Some(m) => f(m),
        None => no_manifest(ctx),
    }
}

fn no_manifest(ctx: &ValidationContext) -> Outcome {
    Outcome::fail(format!("no web app manifest was found for {}", ctx.site_url))
}

fn missing(ctx: &ValidationContext, field: &str) -> Outcome {
    match ctx.provenance() {
        Provenance::Discovered => Outcome::fail(format!("`{}` is missing from the manifest", field)),
        _ => Outcome::fail(format!(
            "`{}` is missing; fill it in before publishing the generated manifest",
            field
        )),
    }
}

fn malformed(field: &str, expected: &str, found: &str) -> Outcome {
    Outcome::fail(format!("`{}` must be of type {}, found {}", field, expected, found))
}

/// Collapses the accessor result into either a value or the failing outcome.
fn require<T>(ctx: &ValidationContext, field: &str, value: Field<T>) -> Result<T, Outcome> {
    match value {
        Field::Present(v) => Ok(v),
        Field::Absent => Err(missing(ctx, field)),
        Field::Malformed { expected, found } => Err(malformed(field, expected, found)),
    }
}

fn require_text<'a>(
    ctx: &ValidationContext,
    m: &'a ManifestDocument,
    field: &str,
) -> Result<&'a str, Outcome> {
    let s = require(ctx, field, m.string(field))?;
    if s.trim().is_empty() {
        return Err(Outcome::fail(format!("`{}` is empty", field)));
    }
    Ok(s)
}

fn manifest_present(ctx: &ValidationContext) -> Outcome {
    if ctx.manifest.is_none() {
        return no_manifest(ctx);
    }
    match ctx.provenance() {
        Provenance::Generated => Outcome::pass("manifest was generated for this site"),
        Provenance::Edited => Outcome::pass("manifest was edited before this scan"),
        Provenance::Discovered => match &ctx.manifest_url {
            Some(url) => Outcome::pass(format!("manifest discovered at {}", url)),
            None => Outcome::pass("manifest discovered"),
        },
    }
}

fn non_empty_string(ctx: &ValidationContext, m: &ManifestDocument, field: &str) -> Outcome {
    match require_text(ctx, m, field) {
        Ok(s) => Outcome::pass(format!("`{}` is set to \"{}\"", field, s.trim())),
        Err(o) => o,
    }
}

fn any_non_empty_string(ctx: &ValidationContext, m: &ManifestDocument, fields: &[String]) -> Outcome {
    let mut problems = Vec::new();
    for f in fields {
        match m.string(f) {
            Field::Present(s) if !s.trim().is_empty() => {
                return Outcome::pass(format!("`{}` is set to \"{}\"", f, s.trim()));
            }
            Field::Present(_) => problems.push(format!("`{}` is empty", f)),
            Field::Malformed { expected, found } => problems.push(format!(
                "`{}` must be of type {}, found {}",
                f, expected, found
            )),
            Field::Absent => {}
        }
    }
    let names: Vec<String> = fields.iter().map(|f| format!("`{}`", f)).collect();
    let mut info = format!("none of {} is set", names.join(", "));
    if !problems.is_empty() {
        info.push_str(&format!(" ({})", problems.join("; ")));
    }
    if ctx.provenance() != Provenance::Discovered {
        info.push_str("; fill one in before publishing the generated manifest");
    }
    Outcome::fail(info)
}

fn max_length(ctx: &ValidationContext, m: &ManifestDocument, field: &str, max: usize) -> Outcome {
    let s = match require_text(ctx, m, field) {
        Ok(s) => s,
        Err(o) => return o,
    };
    let len = s.trim().chars().count();
    if len <= max {
        Outcome::pass(format!("`{}` is {} characters (limit {})", field, len, max))
    } else {
        Outcome::fail(format!(
            "`{}` is {} characters; keep it to {} or fewer so it is not truncated",
            field, len, max
        ))
    }
}

fn one_of(ctx: &ValidationContext, m: &ManifestDocument, field: &str, values: &[String]) -> Outcome {
    let s = match require(ctx, field, m.string(field)) {
        Ok(s) => s,
        Err(o) => return o,
    };
    if values.iter().any(|v| v == s.trim()) {
        Outcome::pass(format!("`{}` is \"{}\"", field, s.trim()))
    } else {
        Outcome::fail(format!(
            "`{}` is \"{}\"; expected one of: {}",
            field,
            s,
            values.join(", ")
        ))
    }
}

/// CSS Color 4 named colours, plus the two keywords accepted wherever a colour is.
const CSS_NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue", "darkcyan",
    "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki", "darkmagenta",
    "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon", "darkseagreen",
    "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise", "darkviolet", "deeppink",
    "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick", "floralwhite", "forestgreen",
    "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod", "gray", "green", "greenyellow",
    "grey", "honeydew", "hotpink", "indianred", "indigo", "ivory", "khaki", "lavender",
    "lavenderblush", "lawngreen", "lemonchiffon", "lightblue", "lightcoral", "lightcyan",
    "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey", "lightpink", "lightsalmon",
    "lightseagreen", "lightskyblue", "lightslategray", "lightslategrey", "lightsteelblue",
    "lightyellow", "lime", "limegreen", "linen", "magenta", "maroon", "mediumaquamarine",
    "mediumblue", "mediumorchid", "mediumpurple", "mediumseagreen", "mediumslateblue",
    "mediumspringgreen", "mediumturquoise", "mediumvioletred", "midnightblue", "mintcream",
    "mistyrose", "moccasin", "navajowhite", "navy", "oldlace", "olive", "olivedrab", "orange",
    "orangered", "orchid", "palegoldenrod", "palegreen", "paleturquoise", "palevioletred",
    "papayawhip", "peachpuff", "peru", "pink", "plum", "powderblue", "purple", "rebeccapurple",
    "red", "rosybrown", "royalblue", "saddlebrown", "salmon", "sandybrown", "seagreen",
    "seashell", "sienna", "silver", "skyblue", "slateblue", "slategray", "slategrey", "snow",
    "springgreen", "steelblue", "tan", "teal", "thistle", "tomato", "turquoise", "violet",
    "wheat", "white", "whitesmoke", "yellow", "yellowgreen", "transparent", "currentcolor",
];

const COLOR_SPACES: &[&str] = &[
    "srgb", "srgb-linear", "display-p3", "a98-rgb", "prophoto-rgb", "rec2020", "xyz", "xyz-d50",
    "xyz-d65",
];

struct ColorPatterns {
    hex: Regex,
    function: Regex,
    component: Regex,
}

fn color_patterns() -> &'static ColorPatterns {
    static PATTERNS: OnceLock<ColorPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ColorPatterns {
        hex: Regex::new(r"^#([0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
            .expect("hex colour pattern is a valid regex"),
        function: Regex::new(r"(?i)^(rgba?|hsla?|hwb|lab|lch|oklab|oklch|color)\(([^()]*)\)$")
            .expect("colour function pattern is a valid regex"),
        component: Regex::new(
            r"(?i)^([+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)(e[+-]?[0-9]+)?(%|deg|rad|grad|turn)?|none)$",
        )
        .expect("colour component pattern is a valid regex"),
    })
}

/// Three channels with an optional alpha, each a number, percentage, angle or `none`.
fn color_components(patterns: &ColorPatterns, tokens: &[&str]) -> bool {
    (3..=4).contains(&tokens.len()) && tokens.iter().all(|t| patterns.component.is_match(t))
}

fn is_css_color(s: &str) -> bool {
    let patterns = color_patterns();
    if patterns.hex.is_match(s) {
        return true;
    }
    if let Some(caps) = patterns.function.captures(s) {
        let tokens: Vec<&str> = caps[2]
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        if caps[1].eq_ignore_ascii_case("color") {
            return match tokens.split_first() {
                Some((space, rest)) => {
                    COLOR_SPACES.iter().any(|c| c.eq_ignore_ascii_case(space))
                        && color_components(patterns, rest)
                }
                None => false,
            };
        }
        return color_components(patterns, &tokens);
    }
    CSS_NAMED_COLORS.iter().any(|c| c.eq_ignore_ascii_case(s))
}

fn color(ctx: &ValidationContext, m: &ManifestDocument, field: &str) -> Outcome {
    let s = match require_text(ctx, m, field) {
        Ok(s) => s.trim(),
        Err(o) => return o,
    };
    if is_css_color(s) {
        Outcome::pass(format!("`{}` is {}", field, s))
    } else {
        Outcome::fail(format!("`{}` value \"{}\" is not a CSS colour", field, s))
    }
}

fn is_web_scheme(u: &Url) -> bool {
    matches!(u.scheme(), "http" | "https")
}

fn url_member(
    ctx: &ValidationContext,
    m: &ManifestDocument,
    field: &str,
    same_origin: bool,
) -> Outcome {
    let raw = match require_text(ctx, m, field) {
        Ok(s) => s,
        Err(o) => return o,
    };
    let resolved = match ctx.resolve(raw) {
        Some(u) if is_web_scheme(&u) => u,
        Some(u) => {
            return Outcome::fail(format!(
                "`{}` resolves to {} which is not an http(s) URL",
                field, u
            ))
        }
        None => return Outcome::fail(format!("`{}` value \"{}\" is not a valid URL", field, raw)),
    };
    if same_origin {
        match ctx.site() {
            Some(site) if site.origin() == resolved.origin() => {}
            Some(_) => {
                return Outcome::fail(format!(
                    "`{}` resolves to {} which is not on the site's origin",
                    field, resolved
                ))
            }
            None => {
                return Outcome::fail(format!(
                    "site URL \"{}\" is not a valid URL; cannot compare origins",
                    ctx.site_url
                ))
            }
        }
    }
    Outcome::pass(format!("`{}` resolves to {}", field, resolved))
}

fn non_empty_array(ctx: &ValidationContext, m: &ManifestDocument, field: &str) -> Outcome {
    match require(ctx, field, m.array(field)) {
        Ok([]) => Outcome::fail(format!("`{}` is an empty list", field)),
        Ok(items) => Outcome::pass(format!("`{}` lists {} entries", field, items.len())),
        Err(o) => o,
    }
}

fn string_array(ctx: &ValidationContext, m: &ManifestDocument, field: &str) -> Outcome {
    let items = match require(ctx, field, m.array(field)) {
        Ok(items) => items,
        Err(o) => return o,
    };
    if items.is_empty() {
        return Outcome::fail(format!("`{}` is an empty list", field));
    }
    if items.iter().any(|v| !v.is_string()) {
        return Outcome::fail(format!("`{}` must only contain strings", field));
    }
    let values: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
    Outcome::pass(format!("`{}` is [{}]", field, values.join(", ")))
}

fn object(
    ctx: &ValidationContext,
    m: &ManifestDocument,
    field: &str,
    required_key: Option<&str>,
) -> Outcome {
    let map = match require(ctx, field, m.object(field)) {
        Ok(map) => map,
        Err(o) => return o,
    };
    if let Some(key) = required_key {
        let ok = map
            .get(key)
            .map(|v| match v.as_str() {
                Some(s) => !s.trim().is_empty(),
                None => !v.is_null(),
            })
            .unwrap_or(false);
        if !ok {
            return Outcome::fail(format!("`{}` is missing `{}`", field, key));
        }
    }
    Outcome::pass(format!("`{}` is configured", field))
}

fn boolean(ctx: &ValidationContext, m: &ManifestDocument, field: &str) -> Outcome {
    match require(ctx, field, m.boolean(field)) {
        Ok(b) => Outcome::pass(format!("`{}` is {}", field, b)),
        Err(o) => o,
    }
}

fn icon_min_size(ctx: &ValidationContext, m: &ManifestDocument, min: u32) -> Outcome {
    let set = match require(ctx, "icons", read_icons(m)) {
        Ok(set) => set,
        Err(o) => return o,
    };
    match set.icons.iter().find(|i| i.at_least(min)) {
        Some(icon) => Outcome::pass(format!(
            "icon {} is at least {}x{}",
            icon.src, min, min
        )),
        None if set.malformed_entries > 0 => Outcome::fail(format!(
            "no icon of at least {}x{}; {} `icons` entries are unusable (missing `src` or not an object)",
            min, min, set.malformed_entries
        )),
        None => Outcome::fail(format!("no icon of at least {}x{}", min, min)),
    }
}

fn icon_purpose(ctx: &ValidationContext, m: &ManifestDocument, purpose: &str) -> Outcome {
    let set = match require(ctx, "icons", read_icons(m)) {
        Ok(set) => set,
        Err(o) => return o,
    };
    match set.icons.iter().find(|i| i.has_purpose(purpose)) {
        Some(icon) => Outcome::pass(format!("icon {} has purpose \"{}\"", icon.src, purpose)),
        None => Outcome::fail(format!("no icon has purpose \"{}\"", purpose)),
    }
}

fn within(scope: &Url, target: &Url) -> bool {
    scope.origin() == target.origin() && target.path().starts_with(scope.path())
}

/// start_url defaults to the page the manifest was collected from.
fn resolved_start_url(ctx: &ValidationContext, m: &ManifestDocument) -> Result<Url, Outcome> {
    match m.string("start_url") {
        Field::Present(raw) if !raw.trim().is_empty() => ctx
            .resolve(raw)
            .ok_or_else(|| Outcome::fail(format!("`start_url` value \"{}\" is not a valid URL", raw))),
        Field::Malformed { expected, found } => Err(malformed("start_url", expected, found)),
        _ => ctx.site().ok_or_else(|| {
            Outcome::fail(format!(
                "`start_url` is not set and site URL \"{}\" is not a valid URL",
                ctx.site_url
            ))
        }),
    }
}

fn start_url_in_scope(ctx: &ValidationContext, m: &ManifestDocument) -> Outcome {
    let raw_scope = match require_text(ctx, m, "scope") {
        Ok(s) => s,
        Err(o) => return o,
    };
    let scope = match ctx.resolve(raw_scope) {
        Some(u) => u,
        None => {
            return Outcome::fail(format!("`scope` value \"{}\" is not a valid URL", raw_scope))
        }
    };
    let start = match resolved_start_url(ctx, m) {
        Ok(u) => u,
        Err(o) => return o,
    };
    if within(&scope, &start) {
        Outcome::pass(format!("start_url {} is inside scope {}", start, scope))
    } else {
        Outcome::fail(format!("start_url {} is outside scope {}", start, scope))
    }
}

fn no_service_worker(ctx: &ValidationContext) -> Outcome {
    Outcome::fail(format!("no service worker was detected on {}", ctx.site_url))
}

fn service_worker_present(ctx: &ValidationContext) -> Outcome {
    match &ctx.service_worker {
        Some(sw) => match &sw.script_url {
            Some(script) => Outcome::pass(format!("service worker {} is registered", script)),
            None => Outcome::pass("service worker is registered"),
        },
        None => no_service_worker(ctx),
    }
}

fn same_origin_sw_url(ctx: &ValidationContext, label: &str, raw: Option<&str>) -> Result<Url, Outcome> {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Err(Outcome::fail(format!("service worker did not report a {}", label))),
    };
    let resolved = ctx
        .resolve_on_site(raw)
        .ok_or_else(|| Outcome::fail(format!("service worker {} \"{}\" is not a valid URL", label, raw)))?;
    match ctx.site() {
        Some(site) if site.origin() == resolved.origin() => Ok(resolved),
        _ => Err(Outcome::fail(format!(
            "service worker {} {} is not on the site's origin",
            label, resolved
        ))),
    }
}

fn service_worker_scope(ctx: &ValidationContext) -> Outcome {
    let Some(sw) = &ctx.service_worker else {
        return no_service_worker(ctx);
    };
    match same_origin_sw_url(ctx, "scope", sw.scope.as_deref()) {
        Ok(u) => Outcome::pass(format!("service worker scope is {}", u)),
        Err(o) => o,
    }
}

fn service_worker_script(ctx: &ValidationContext) -> Outcome {
    let Some(sw) = &ctx.service_worker else {
        return no_service_worker(ctx);
    };
    match same_origin_sw_url(ctx, "script URL", sw.script_url.as_deref()) {
        Ok(u) => Outcome::pass(format!("service worker script is {}", u)),
        Err(o) => o,
    }
}

fn service_worker_controls_start_url(ctx: &ValidationContext) -> Outcome {
    let Some(sw) = &ctx.service_worker else {
        return no_service_worker(ctx);
    };
    let Some(m) = &ctx.manifest else {
        return no_manifest(ctx);
    };
    let scope = match same_origin_sw_url(ctx, "scope", sw.scope.as_deref()) {
        Ok(u) => u,
        Err(o) => return o,
    };
    let start = match resolved_start_url(ctx, m) {
        Ok(u) => u,
        Err(o) => return o,
    };
    if within(&scope, &start) {
        Outcome::pass(format!("service worker scope {} controls {}", scope, start))
    } else {
        Outcome::fail(format!(
            "start_url {} is outside the service worker scope {}; the app will not load offline",
            start, scope
        ))
    }
}

fn is_local_host(u: &Url) -> bool {
    match u.host_str() {
        Some(h) => {
            h == "localhost" || h.ends_with(".localhost") || h == "127.0.0.1" || h == "[::1]"
        }
        None => false,
    }
}

fn site_https(ctx: &ValidationContext) -> Outcome {
    let Some(site) = ctx.site() else {
        return Outcome::fail(format!("site URL \"{}\" is not a valid URL", ctx.site_url));
    };
    if site.scheme() == "https" {
        Outcome::pass("site is served over HTTPS")
    } else if site.scheme() == "http" && is_local_host(&site) {
        Outcome::pass("site is served from localhost; HTTPS is required once deployed")
    } else {
        Outcome::fail(format!("site is served over {}, not HTTPS", site.scheme()))
    }
}

fn unhosted_manifest(ctx: &ValidationContext) -> Outcome {
    if ctx.is_generated {
        Outcome::fail("generated manifest is not hosted on the site yet")
    } else {
        Outcome::fail("manifest URL is unknown")
    }
}

fn manifest_https(ctx: &ValidationContext) -> Outcome {
    let Some(url) = ctx.manifest_location() else {
        return unhosted_manifest(ctx);
    };
    if url.scheme() == "https" || (url.scheme() == "http" && is_local_host(&url)) {
        Outcome::pass(format!("manifest is served from {}", url))
    } else {
        Outcome::fail(format!("manifest is served over {}, not HTTPS", url.scheme()))
    }
}

fn manifest_same_origin(ctx: &ValidationContext) -> Outcome {
    let Some(url) = ctx.manifest_location() else {
        return unhosted_manifest(ctx);
    };
    match ctx.site() {
        Some(site) if site.origin() == url.origin() => {
            Outcome::pass("manifest is served from the site's origin")
        }
        Some(site) => Outcome::fail(format!(
            "manifest origin {} differs from site origin {}",
            url.origin().ascii_serialization(),
            site.origin().ascii_serialization()
        )),
        None => Outcome::fail(format!("site URL \"{}\" is not a valid URL", ctx.site_url)),
    }
}
