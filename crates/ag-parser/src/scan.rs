//! Hand-written scanner for the `name[index]` attribute-reference token,
//! the only structured piece of an otherwise free-form rule body (spec §6).

/// One `name[index]` occurrence found in a line of text, with the byte span
/// it occupied so callers can check it consumed an entire trimmed field.
pub struct AttrRefMatch {
  pub name: String,
  pub index: usize,
  pub start: usize,
  pub end: usize,
}

fn is_name_start(c: char) -> bool {
  c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}

/// Scans `text` left to right for every `<name>[<index>]` token, skipping
/// any other character. Overlapping candidates are not possible since a
/// match always consumes through the closing `]`.
pub fn scan_attr_refs(text: &str) -> Vec<AttrRefMatch> {
  let bytes: Vec<char> = text.chars().collect();
  let mut found = Vec::new();
  let mut i = 0usize;

  while i < bytes.len() {
    if !is_name_start(bytes[i]) {
      i += 1;
      continue;
    }
    let name_start = i;
    let mut j = i + 1;
    while j < bytes.len() && is_name_continue(bytes[j]) {
      j += 1;
    }
    if j >= bytes.len() || bytes[j] != '[' {
      i = j.max(i + 1);
      continue;
    }
    let digits_start = j + 1;
    let mut k = digits_start;
    while k < bytes.len() && bytes[k].is_ascii_digit() {
      k += 1;
    }
    if k == digits_start || k >= bytes.len() || bytes[k] != ']' {
      i = j;
      continue;
    }

    let name: String = bytes[name_start..j].iter().collect();
    let index: usize = bytes[digits_start..k].iter().collect::<String>().parse().expect("scanned only ASCII digits");
    found.push(AttrRefMatch { name, index, start: name_start, end: k + 1 });
    i = k + 1;
  }

  found
}
