#[cfg(test)]
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    escape_html_into(&mut out, input);
    out
}

static NEEDS_ESCAPE: [bool; 256] = {
    let mut t = [false; 256];
    t[b'&' as usize] = true;
    t[b'<' as usize] = true;
    t[b'>' as usize] = true;
    t[b'"' as usize] = true;
    t
};

#[inline]
pub(crate) fn escape_html_into(out: &mut String, input: &str) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut last = 0;
    let mut i = 0;

    while i < len {
        if !NEEDS_ESCAPE[bytes[i] as usize] {
            i += 1;
            continue;
        }
        let replacement = match bytes[i] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => "&quot;",
        };
        if last < i {
            out.push_str(&input[last..i]);
        }
        out.push_str(replacement);
        i += 1;
        last = i;
    }

    if last < len {
        out.push_str(&input[last..len]);
    }
}

/// Writes `input` inside a CDATA section, splitting any `]]>` it contains.
pub(crate) fn push_cdata(out: &mut String, input: &str) {
    out.push_str("<![CDATA[");
    let mut rest = input;
    while let Some(idx) = rest.find("]]>") {
        out.push_str(&rest[..idx]);
        out.push_str("]]]]><![CDATA[>");
        rest = &rest[idx + 3..];
    }
    out.push_str(rest);
    out.push_str("]]>");
}

static HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

pub(crate) fn push_percent_encoded(out: &mut String, b: u8) {
    out.push('%');
    out.push(HEX_CHARS[(b >> 4) as usize] as char);
    out.push(HEX_CHARS[(b & 0xF) as usize] as char);
}

pub(crate) static URL_HTML_SAFE: [bool; 256] = {
    let mut t = [false; 256];
    let mut i = b'A';
    while i <= b'Z' {
        t[i as usize] = true;
        i += 1;
    }
    let mut i = b'a';
    while i <= b'z' {
        t[i as usize] = true;
        i += 1;
    }
    let mut i = b'0';
    while i <= b'9' {
        t[i as usize] = true;
        i += 1;
    }
    let extra = b"-_.~!*'();/?:@=+$,#";
    let mut j = 0;
    while j < extra.len() {
        t[extra[j] as usize] = true;
        j += 1;
    }
    t
};

pub(crate) fn encode_url_escaped_into(out: &mut String, url: &str) {
    let bytes = url.as_bytes();
    let len = bytes.len();
    let mut last = 0;
    let mut i = 0;

    while i < len {
        let b = bytes[i];
        if URL_HTML_SAFE[b as usize] {
            i += 1;
            continue;
        }
        if b == b'%'
            && i + 2 < len
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            i += 3;
            continue;
        }
        if last < i {
            out.push_str(&url[last..i]);
        }
        if b == b'&' {
            out.push_str("&amp;");
            i += 1;
        } else {
            let end = (i + crate::utf8_char_len(b)).min(len);
            for &byte in &bytes[i..end] {
                push_percent_encoded(out, byte);
            }
            i = end;
        }
        last = i;
    }

    if last < len {
        out.push_str(&url[last..len]);
    }
}

/// Length of the entity reference starting at `bytes[start]` (which must be
/// `&`), if it is syntactically valid: `&name;`, `&#123;` or `&#x1F;`.
pub(crate) fn entity_len(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if bytes.get(i) == Some(&b'#') {
        i += 1;
        let hex = matches!(bytes.get(i), Some(b'x' | b'X'));
        if hex {
            i += 1;
        }
        let digits = i;
        while i < bytes.len()
            && i - digits < 8
            && (if hex {
                bytes[i].is_ascii_hexdigit()
            } else {
                bytes[i].is_ascii_digit()
            })
        {
            i += 1;
        }
        if i == digits || i - digits > 7 {
            return None;
        }
    } else {
        let name = i;
        if !bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
            return None;
        }
        while i < bytes.len() && i - name < 32 && bytes[i].is_ascii_alphanumeric() {
            i += 1;
        }
    }
    (bytes.get(i) == Some(&b';')).then_some(i + 1 - start)
}

/// Schemes a safe link may use.
static SAFE_SCHEMES: &[&str] = &["ftp", "ftps", "http", "https", "mailto", "news"];

/// Whether `url` is relative or uses an allowed scheme.
pub(crate) fn is_safe_url(url: &str) -> bool {
    let url = url.trim_start();
    let Some(colon) = url.find(':') else {
        return true;
    };
    let scheme = &url[..colon];
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    SAFE_SCHEMES
        .iter()
        .any(|safe| safe.eq_ignore_ascii_case(scheme))
}

#[inline(always)]
pub(crate) fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
