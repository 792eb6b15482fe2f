use super::{Element, Node};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];
// Opening one of these while the same tag is the innermost open element closes it first
const SELF_NESTING_CLOSES: &[&str] = &["li", "option", "p", "tr", "td", "th"];

/// Tolerant HTML fragment parser. Unknown end tags are ignored, unclosed
/// elements are closed at end of input, script/style bodies are dropped.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let mut stack: Vec<Element> = vec![Element::new("#fragment")];
    let mut rest = html;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(i) => &after[i + 3..],
                None => "",
            };
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            rest = match rest.find('>') {
                Some(i) => &rest[i + 1..],
                None => "",
            };
            continue;
        }
        if let Some(after) = rest.strip_prefix("</") {
            let end = after.find('>').unwrap_or(after.len());
            let name = after[..end].trim().to_ascii_lowercase();
            close_element(&mut stack, &name);
            rest = after.get(end + 1..).unwrap_or("");
            continue;
        }
        let opens_tag = rest.starts_with('<')
            && rest[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic());
        if opens_tag {
            let (el, self_closing, consumed) = parse_start_tag(rest);
            rest = &rest[consumed..];
            let tag = el.tag.clone();
            if self_closing || VOID_TAGS.contains(&tag.as_str()) {
                push_child(&mut stack, Node::Element(el));
            } else if RAW_TEXT_TAGS.contains(&tag.as_str()) {
                // to_ascii_lowercase keeps byte offsets intact
                let lower = rest.to_ascii_lowercase();
                let close = format!("</{tag}");
                rest = match lower.find(&close) {
                    Some(i) => {
                        let tail = &rest[i..];
                        match tail.find('>') {
                            Some(j) => &tail[j + 1..],
                            None => "",
                        }
                    }
                    None => "",
                };
                push_child(&mut stack, Node::Element(el));
            } else {
                if SELF_NESTING_CLOSES.contains(&tag.as_str())
                    && stack.len() > 1
                    && stack.last().map(|e| e.tag == tag).unwrap_or(false)
                {
                    close_element(&mut stack, &tag);
                }
                stack.push(el);
            }
            continue;
        }
        let end = if rest.starts_with('<') {
            rest[1..].find('<').map(|i| i + 1).unwrap_or(rest.len())
        } else {
            rest.find('<').unwrap_or(rest.len())
        };
        let text = decode_entities(&rest[..end]);
        if !text.is_empty() {
            push_child(&mut stack, Node::Text(text));
        }
        rest = &rest[end..];
    }
    while stack.len() > 1 {
        if let Some(el) = stack.pop() {
            push_child(&mut stack, Node::Element(el));
        }
    }
    stack.pop().map(|r| r.children).unwrap_or_default()
}

/// First element of a fragment, skipping leading text (like a template's
/// `firstElementChild`).
pub fn first_element(html: &str) -> Option<Element> {
    parse_fragment(html.trim()).into_iter().find_map(|n| match n {
        Node::Element(e) => Some(e),
        Node::Text(_) => None,
    })
}

fn push_child(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn close_element(stack: &mut Vec<Element>, name: &str) {
    let Some(pos) = stack.iter().rposition(|e| e.tag == name) else {
        return;
    };
    if pos == 0 {
        return;
    }
    while stack.len() > pos {
        if let Some(el) = stack.pop() {
            push_child(stack, Node::Element(el));
        }
    }
}

// Returns the element, whether it was written as `<x/>`, and bytes consumed.
// Scanning only stops on ASCII bytes, so every slice lands on a char boundary.
fn parse_start_tag(src: &str) -> (Element, bool, usize) {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let mut i = 1;
    while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/' {
        i += 1;
    }
    let mut el = Element::new(&src[1..i]);
    let mut self_closing = false;
    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                self_closing = true;
                i += 1;
                continue;
            }
            _ => {}
        }
        self_closing = false;
        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = src[name_start..i].to_ascii_lowercase();
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if i < len && bytes[i] == b'=' {
            i += 1;
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let start = i;
                while i < len && bytes[i] != quote {
                    i += 1;
                }
                value = decode_entities(&src[start..i]);
                if i < len {
                    i += 1;
                }
            } else {
                let start = i;
                while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                value = decode_entities(&src[start..i]);
            }
        }
        if !name.is_empty() && !el.has_attr(&name) {
            el.attrs.push((name, value));
        }
    }
    (el, self_closing, i)
}

pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity_char(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity_char(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "rarr" => '→',
        _ => return None,
    })
}
