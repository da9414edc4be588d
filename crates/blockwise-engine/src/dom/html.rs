use super::{Dom, NodeId, NodeKind, SINGLE_TAGS};

/// A byte cursor over an HTML string.
///
/// Byte steps only happen over ASCII delimiters; text is stepped a whole char
/// at a time with [`Cursor::bump_char`], so `i` stays on a char boundary.
struct Cursor<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i..].starts_with(pat)
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    fn bump_char(&mut self) {
        self.i += self.s[self.i..].chars().next().map_or(1, char::len_utf8);
    }

    fn bump_n(&mut self, n: usize) {
        self.i = (self.i + n).min(self.s.len());
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.i += 1;
        }
    }

    /// Consumes bytes while `pred` holds and returns them as a slice.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.i;
        while self.peek().is_some_and(&pred) {
            self.i += 1;
        }
        &self.s[start..self.i]
    }

    /// Consumes up to (not including) `pat`, or to the end.
    fn take_until(&mut self, pat: &str) -> &'a str {
        let start = self.i;
        match self.s[start..].find(pat) {
            Some(offset) => self.i = start + offset,
            None => self.i = self.s.len(),
        }
        &self.s[start..self.i]
    }

    /// Like [`Cursor::take_until`] but matching `pat` ASCII case-insensitively.
    fn take_until_ignore_case(&mut self, pat: &str) -> &'a str {
        let start = self.i;
        let haystack = self.s[start..].to_ascii_lowercase();
        match haystack.find(&pat.to_ascii_lowercase()) {
            Some(offset) => self.i = start + offset,
            None => self.i = self.s.len(),
        }
        &self.s[start..self.i]
    }
}

fn is_name_byte(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'=' | b'/' | b'>' | b'<' | b'"' | b'\'')
}

/// Parses an HTML fragment into a detached fragment node.
///
/// Tolerant by construction: stray `<` becomes text, unknown closing tags are
/// ignored and unclosed elements close at the end of input.
pub fn parse_fragment(dom: &mut Dom, html: &str) -> NodeId {
    let fragment = dom.create_fragment();
    let mut stack: Vec<(NodeId, String)> = vec![(fragment, String::new())];
    let mut cur = Cursor::new(html);

    while !cur.eof() {
        let parent = stack.last().map_or(fragment, |(id, _)| *id);

        if cur.starts_with(b"<!--") {
            cur.bump_n(4);
            cur.take_until("-->");
            cur.bump_n(3);
            continue;
        }

        if cur.starts_with(b"</") && cur.peek_at(2).is_some_and(|b| b.is_ascii_alphabetic()) {
            cur.bump_n(2);
            let name = cur.take_while(is_name_byte).to_ascii_lowercase();
            cur.take_until(">");
            cur.bump();
            if let Some(depth) = stack.iter().rposition(|(_, tag)| *tag == name) {
                stack.truncate(depth.max(1));
            }
            continue;
        }

        if cur.peek() == Some(b'<') && cur.peek_at(1).is_some_and(|b| b.is_ascii_alphabetic()) {
            cur.bump();
            let name = cur.take_while(is_name_byte).to_ascii_lowercase();
            let element = dom.create_element(&name);
            let self_closing = parse_attributes(&mut cur, dom, element);
            dom.append_child(parent, element);

            if name == "textarea" {
                let raw = cur.take_until_ignore_case("</textarea");
                let value = html_escape::decode_html_entities(raw);
                dom.set_input_value(element, &value);
                cur.take_until(">");
                cur.bump();
            } else if !self_closing && !SINGLE_TAGS.contains(&name.as_str()) {
                stack.push((element, name));
            }
            continue;
        }

        let start = cur.i;
        cur.bump_char();
        cur.take_until("<");
        let raw = &html[start..cur.i];
        let text = html_escape::decode_html_entities(raw);
        let node = dom.create_text(&text);
        dom.append_child(parent, node);
    }

    dom.normalize(fragment);
    fragment
}

/// Returns true when the tag ended with `/>`.
fn parse_attributes(cur: &mut Cursor<'_>, dom: &mut Dom, element: NodeId) -> bool {
    loop {
        cur.skip_whitespace();
        match cur.peek() {
            None => return false,
            Some(b'>') => {
                cur.bump();
                return false;
            }
            Some(b'/') => {
                cur.bump();
                if cur.peek() == Some(b'>') {
                    cur.bump();
                    return true;
                }
            }
            Some(_) => {
                let name = cur.take_while(is_name_byte).to_ascii_lowercase();
                if name.is_empty() {
                    cur.bump();
                    continue;
                }
                cur.skip_whitespace();
                let mut value = String::new();
                if cur.peek() == Some(b'=') {
                    cur.bump();
                    cur.skip_whitespace();
                    let raw = match cur.peek() {
                        Some(quote @ (b'"' | b'\'')) => {
                            cur.bump();
                            let raw = cur.take_until(if quote == b'"' { "\"" } else { "'" });
                            cur.bump();
                            raw
                        }
                        _ => cur.take_while(|b| !b.is_ascii_whitespace() && b != b'>'),
                    };
                    value = html_escape::decode_html_entities(raw).into_owned();
                }
                if name == "value" && dom.input(element).is_some() {
                    dom.set_input_value(element, &value);
                }
                dom.set_attr(element, &name, &value);
            }
        }
    }
}

impl Dom {
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if self.tag(id) == Some("textarea") {
            if let Some(input) = self.input(id) {
                out.push_str(&html_escape::encode_text(&input.value));
            }
            return out;
        }
        for child in self.children(id) {
            self.write_html(*child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Replaces the children of `id` with the parsed fragment.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        self.remove_children(id);
        let fragment = parse_fragment(self, html);
        self.append_child(id, fragment);
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(&html_escape::encode_text(text)),
            NodeKind::Fragment => {
                for child in self.children(id) {
                    self.write_html(*child, out);
                }
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                if !element.classes.is_empty() {
                    out.push_str(" class=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(
                        &element.classes.join(" "),
                    ));
                    out.push('"');
                }
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if SINGLE_TAGS.contains(&element.tag.as_str()) {
                    return;
                }
                out.push_str(&self.inner_html(id));
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}
