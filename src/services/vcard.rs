// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! vCard 3.0 rendering of a profile bundle.

use crate::services::bundle::ProfileBundle;

const CRLF: &str = "\r\n";
const FALLBACK_FILENAME: &str = "contact.vcf";

/// Platforms whose URL becomes the card's `URL` line.
const WEBSITE_PLATFORMS: [&str; 3] = ["website", "link", "url"];

/// A rendered card and the filename to offer for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCard {
    pub body: String,
    pub filename: String,
}

impl VCard {
    pub fn from_bundle(bundle: &ProfileBundle) -> Self {
        let name = bundle.user.name.as_str();
        let profile = &bundle.profile;

        let mut lines = vec![
            "BEGIN:VCARD".to_string(),
            "VERSION:3.0".to_string(),
            format!("N:{};", escape_text(name)),
            format!("FN:{}", escape_text(name)),
            format!("ORG:{}", escape_text(profile.company.as_deref().unwrap_or(""))),
            format!(
                "TITLE:{}",
                escape_text(profile.job_title.as_deref().unwrap_or(""))
            ),
        ];

        if let Some(phone) = non_empty(profile.phone_number.as_deref()) {
            lines.push(format!("TEL;TYPE=CELL:{}", single_line(phone)));
        }
        if let Some(email) = non_empty(Some(bundle.user.email.as_str())) {
            lines.push(format!("EMAIL;TYPE=INTERNET:{}", single_line(email)));
        }

        let website = bundle
            .social_links
            .iter()
            .find(|l| WEBSITE_PLATFORMS.contains(&l.platform.as_str()));
        if let Some(link) = website {
            lines.push(format!("URL:{}", single_line(&link.url)));
        }

        lines.push("END:VCARD".to_string());

        Self {
            body: lines.join(CRLF),
            filename: filename_for(name),
        }
    }

    /// `Content-Disposition` value for the download.
    ///
    /// Non-ASCII names use the RFC 5987 `filename*` form.
    pub fn content_disposition(&self) -> String {
        let plain = self
            .filename
            .chars()
            .all(|c| c.is_ascii_graphic() && c != '"' && c != '\\' && c != ';');
        if plain {
            format!("attachment; filename={}", self.filename)
        } else {
            format!(
                "attachment; filename={}; filename*=UTF-8''{}",
                FALLBACK_FILENAME,
                urlencoding::encode(&self.filename)
            )
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn filename_for(name: &str) -> String {
    if name.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        format!("{}.vcf", name.replace([' ', '/', '\\'], "_"))
    }
}

/// Escape line breaks only, for values that are not TEXT (phone, email, URL).
fn single_line(value: &str) -> String {
    escape_value(value, false)
}

/// Escape a TEXT value (RFC 2426 §4): backslash, comma, semicolon and newlines.
fn escape_text(value: &str) -> String {
    escape_value(value, true)
}

/// CR, LF and CRLF always become a literal `\n`, so no value can end its line.
fn escape_value(value: &str, text: bool) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if text => out.push_str("\\\\"),
            ',' if text => out.push_str("\\,"),
            ';' if text => out.push_str("\\;"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}
