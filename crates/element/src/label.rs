/// Turns a field-style identifier into a display label: strips `m_`/`_`
/// prefixes, splits snake_case and camelCase (keeping acronym runs
/// together), separates digit runs, and capitalizes each word.
///
/// `m_fooBar` → `Foo Bar`, `maxHTTPRetries2` → `Max HTTP Retries 2`.
pub fn nicify(name: &str) -> String {
	let name = name.strip_prefix("m_").unwrap_or(name);
	let name = name.strip_prefix('_').unwrap_or(name);

	let mut out = String::with_capacity(name.len() + 4);
	let chars: Vec<char> = name.chars().collect();
	for (i, &ch) in chars.iter().enumerate() {
		if ch == '_' {
			if !out.ends_with(' ') && !out.is_empty() {
				out.push(' ');
			}
			continue;
		}
		let prev = if i > 0 { Some(chars[i - 1]) } else { None };
		let next = chars.get(i + 1).copied();
		let boundary = match prev {
			None => false,
			Some(p) => {
				(ch.is_uppercase() && p.is_lowercase())
					|| (ch.is_uppercase() && p.is_uppercase() && next.is_some_and(|n| n.is_lowercase()))
					|| (ch.is_ascii_digit() && !p.is_ascii_digit() && p != ' ')
					|| (!ch.is_ascii_digit() && prev.is_some_and(|p| p.is_ascii_digit()))
			}
		};
		if boundary && !out.ends_with(' ') && !out.is_empty() {
			out.push(' ');
		}
		if out.is_empty() || out.ends_with(' ') {
			out.extend(ch.to_uppercase());
		} else {
			out.push(ch);
		}
	}
	out.trim_end().to_string()
}
