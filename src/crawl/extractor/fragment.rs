use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};

use super::generic;
use super::rules::FragmentMatch;

/// Minimal view of a document node: just enough to walk out a section.
/// Keeps the walk testable without a real DOM behind it.
pub trait SectionNode: Sized {
    fn tag(&self) -> Option<String>;
    fn text(&self) -> String;
    fn next_sibling(&self) -> Option<Self>;
    fn children(&self) -> Vec<Self>;

    /// 1..=6 for h1..h6, None for everything else.
    fn heading_rank(&self) -> Option<u8> {
        let tag = self.tag()?;
        let mut chars = tag.chars();
        if chars.next()? != 'h' {
            return None;
        }
        let rank = chars.next()?.to_digit(10)? as u8;
        if chars.next().is_some() || !(1..=6).contains(&rank) {
            return None;
        }
        Some(rank)
    }
}

/// Collect the content belonging to the section the anchor starts.
///
/// A `<section>` anchor owns its child elements up to the first nested
/// section. Any other anchor owns its own text plus following element
/// siblings until a heading of equal-or-higher rank; an anchor that is not
/// itself a heading ranks below every heading, so any heading ends its
/// section. Non-heading siblings are always included.
pub fn collect_section<N: SectionNode>(anchor: &N) -> String {
    let mut parts: Vec<String> = Vec::new();

    if anchor.tag().as_deref() == Some("section") {
        for child in anchor.children() {
            if child.tag().as_deref() == Some("section") {
                break;
            }
            if child.tag().is_none() {
                continue;
            }
            let text = child.text();
            if !text.is_empty() {
                parts.push(text);
            }
        }
        return parts.join("\n");
    }

    let own = anchor.text();
    if !own.is_empty() {
        parts.push(own);
    }

    let anchor_rank = anchor.heading_rank().unwrap_or(6);
    let mut current = anchor.next_sibling();
    while let Some(node) = current {
        if node.tag().is_some() {
            if let Some(rank) = node.heading_rank() {
                if rank <= anchor_rank {
                    break;
                }
            }
            let text = node.text();
            if !text.is_empty() {
                parts.push(text);
            }
        }
        current = node.next_sibling();
    }
    parts.join("\n")
}

/// Narrow already-extracted content to the section addressed by the URL
/// fragment. Returns None when the anchor cannot be located or its section
/// has no text, in which case the caller keeps the unnarrowed content.
pub fn narrow(doc: &Html, fragment: &str, strategies: &[FragmentMatch]) -> Option<String> {
    let anchor = locate_anchor(doc, fragment, strategies)?;
    let text = collect_section(&DomNode { node: anchor });
    if text.trim().is_empty() { None } else { Some(text) }
}

fn locate_anchor<'a>(
    doc: &'a Html,
    fragment: &str,
    strategies: &[FragmentMatch],
) -> Option<NodeRef<'a, Node>> {
    for strategy in strategies {
        let found = match strategy {
            FragmentMatch::Id => by_id(doc, fragment),
            FragmentMatch::SectionDotted => section_by_dotted_id(doc, fragment),
            FragmentMatch::HeadingText => heading_by_text(doc, fragment, false),
            FragmentMatch::HeadingDotted => heading_by_text(doc, fragment, true),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn by_id<'a>(doc: &'a Html, id: &str) -> Option<NodeRef<'a, Node>> {
    doc.tree
        .root()
        .descendants()
        .find(|n| n.value().as_element().and_then(|e| e.attr("id")) == Some(id))
}

fn section_by_dotted_id<'a>(doc: &'a Html, fragment: &str) -> Option<NodeRef<'a, Node>> {
    let wanted = dotted(fragment);
    let sel = Selector::parse("section[id]").ok()?;
    doc.select(&sel)
        .find(|s| dotted(s.value().attr("id").unwrap_or_default()).contains(&wanted))
        .map(|el| *el)
}

/// Find an h2 whose title text carries the fragment. When the heading sits
/// inside a section, the section is the anchor; otherwise the heading is.
fn heading_by_text<'a>(
    doc: &'a Html,
    fragment: &str,
    fold_punctuation: bool,
) -> Option<NodeRef<'a, Node>> {
    let needle = if fold_punctuation { dotted(fragment) } else { fragment.to_string() };
    let needle = needle.to_lowercase();
    let sel = Selector::parse("h2").ok()?;
    for heading in doc.select(&sel) {
        let text = heading.text().collect::<String>().to_lowercase();
        if text.contains(&needle) {
            let node = *heading;
            if let Some(parent) = node.parent() {
                if parent.value().as_element().is_some_and(|e| e.name() == "section") {
                    return Some(parent);
                }
            }
            return Some(node);
        }
    }
    None
}

fn dotted(s: &str) -> String {
    s.replace('-', ".")
}

struct DomNode<'a> {
    node: NodeRef<'a, Node>,
}

impl<'a> SectionNode for DomNode<'a> {
    fn tag(&self) -> Option<String> {
        self.node.value().as_element().map(|e| e.name().to_string())
    }

    fn text(&self) -> String {
        match self.node.value() {
            Node::Element(_) => ElementRef::wrap(self.node)
                .map(generic::joined_text)
                .unwrap_or_default(),
            Node::Text(t) => t.trim().to_string(),
            _ => String::new(),
        }
    }

    fn next_sibling(&self) -> Option<Self> {
        self.node.next_sibling().map(|node| DomNode { node })
    }

    fn children(&self) -> Vec<Self> {
        self.node.children().map(|node| DomNode { node }).collect()
    }
}
