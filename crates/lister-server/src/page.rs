//! Server-rendered HTML for the form and result pages.

use std::borrow::Cow;
use std::fmt::Write;

use lister_core::Listing;

/// Entry page with a single product-URL input.
pub const FORM_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Easy Lister</title></head>
<body>
    <h2>Paste an Amazon or AliExpress product link:</h2>
    <form method="post">
        <input type="text" name="url" style="width: 400px" required />
        <input type="submit" value="Generate listing" />
    </form>
</body>
</html>
"#;

/// Escape text for interpolation into HTML element content or a quoted attribute.
pub fn escape(input: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(input)
}

/// Result page for a processed listing.
pub fn render_listing(listing: &Listing) -> String {
    let record = &listing.record;
    let mut html = String::new();

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
    <h2>{title}</h2>
    <p>Original price: {price}</p>
    <p>Listing price: <strong>{listing_price}</strong></p>
    <h3>Description</h3>
    <p>{description}</p>
"#,
        title = escape(&record.title),
        price = record.price,
        listing_price = listing.listing_price,
        description = escape(&record.description),
    );

    if !record.images.is_empty() {
        html.push_str("    <h3>Images</h3>\n");
        for image in &record.images {
            let src = escape(image);
            let _ = writeln!(
                html,
                r#"    <a href="{src}"><img src="{src}" style="max-width: 200px" /></a>"#
            );
        }
    }

    let _ = write!(
        html,
        r#"    <p><small>Source: {source}{fallback}</small></p>
    <p><a href="/">New listing</a></p>
</body>
</html>
"#,
        source = escape(&listing.source_url),
        fallback = if listing.used_fallback {
            " (static fetch)"
        } else {
            ""
        },
    );

    html
}
