use scraper::{ElementRef, Html};

/// Opaque handle into a [`Document`]. Handles are only meaningful for the
/// document that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

struct DomNode {
    tag: String,
    id: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: String,
}

/// Read-only element tree of one parsed page.
///
/// The tree is built once from the HTML and never mutated afterwards, so
/// every query is deterministic and extraction can run any number of times
/// with identical results. Only element nodes are kept; `children` mirrors
/// the DOM's element children, while `text` carries the full text content
/// of the subtree (like `textContent`).
pub struct Document {
    nodes: Vec<DomNode>,
}

impl Document {
    pub fn parse(html: &str) -> Document {
        let parsed = Html::parse_document(html);
        let mut document = Document { nodes: Vec::new() };
        document.add_element(parsed.root_element(), None);
        document
    }

    fn add_element(&mut self, element: ElementRef, parent: Option<NodeId>) -> NodeId {
        let node = NodeId(self.nodes.len());
        self.nodes.push(DomNode {
            tag: element.value().name().to_string(),
            id: element.value().attr("id").map(str::to_string),
            parent,
            children: Vec::new(),
            text: element.text().collect(),
        });
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                let child_node = self.add_element(child_element, Some(node));
                self.nodes[node.0].children.push(child_node);
            }
        }
        node
    }

    fn node(&self, node: NodeId) -> &DomNode {
        &self.nodes[node.0]
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.node(node).tag
    }

    /// Full text content of the node's subtree, whitespace as parsed.
    pub fn text(&self, node: NodeId) -> &str {
        &self.node(node).text
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Element children, in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    /// All nodes whose id attribute contains `fragment`, in document order.
    pub fn find_by_id_contains(&self, fragment: &str) -> Vec<NodeId> {
        self.find_by_id(|id| id.contains(fragment))
    }

    /// All nodes whose id attribute starts with `prefix`, in document order.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Vec<NodeId> {
        self.find_by_id(|id| id.starts_with(prefix))
    }

    fn find_by_id(&self, matches: impl Fn(&str) -> bool) -> Vec<NodeId> {
        // Arena indices follow pre-order construction, so a linear scan
        // yields document order.
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.id.as_deref().is_some_and(&matches))
            .map(|(index, _)| NodeId(index))
            .collect()
    }

    pub fn descendants_by_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_descendants(node, &|n: &DomNode| n.tag == tag, &mut found);
        found
    }

    pub fn descendants_by_id_contains(&self, node: NodeId, fragment: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let wanted = |n: &DomNode| n.id.as_deref().is_some_and(|id| id.contains(fragment));
        self.collect_descendants(node, &wanted, &mut found);
        found
    }

    fn collect_descendants(
        &self,
        node: NodeId,
        matches: &dyn Fn(&DomNode) -> bool,
        out: &mut Vec<NodeId>,
    ) {
        for &child in &self.node(node).children {
            if matches(self.node(child)) {
                out.push(child);
            }
            self.collect_descendants(child, matches, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "<html><body>\
        <h1 id=\"title_0\">Les Visiteurs</h1>\
        <section>\
          <h2 id=\"Saison_1\">Saison 1</h2>\
          <table><tr><th>Titre</th></tr><tr><td><i>Pilot</i></td></tr></table>\
        </section>\
        <section><h2 id=\"Saison_2\">Saison 2</h2></section>\
        </body></html>";

    #[test]
    fn test_find_by_id() {
        let doc = Document::parse(SAMPLE);

        let seasons = doc.find_by_id_contains("Saison_");
        assert_eq!(seasons.len(), 2);
        assert_eq!(doc.text(seasons[0]), "Saison 1");
        assert_eq!(doc.text(seasons[1]), "Saison 2");

        let titles = doc.find_by_id_prefix("title_");
        assert_eq!(titles.len(), 1);
        assert_eq!(doc.text(titles[0]), "Les Visiteurs");

        assert!(doc.find_by_id_prefix("aison").is_empty());
        assert_eq!(doc.find_by_id_contains("aison").len(), 2);
    }

    #[test]
    fn test_parent_and_children() {
        let doc = Document::parse(SAMPLE);
        let season = doc.find_by_id_contains("Saison_1")[0];

        let section = doc.parent(season).unwrap();
        assert_eq!(doc.tag(section), "section");

        // h2 + table (the parser inserts tbody inside the table).
        let kids = doc.children(section);
        assert_eq!(kids.len(), 2);
        assert_eq!(doc.tag(kids[0]), "h2");
        assert_eq!(doc.tag(kids[1]), "table");
    }

    #[test]
    fn test_descendants() {
        let doc = Document::parse(SAMPLE);
        let season = doc.find_by_id_contains("Saison_1")[0];
        let section = doc.parent(season).unwrap();

        let rows = doc.descendants_by_tag(section, "tr");
        assert_eq!(rows.len(), 2);
        assert_eq!(doc.text(rows[0]), "Titre");
        assert_eq!(doc.text(rows[1]), "Pilot");

        // Cells of the data row are element children of the tr, and the
        // nested <i> is the cell's only element child.
        let cells = doc.children(rows[1]);
        assert_eq!(cells.len(), 1);
        assert_eq!(doc.tag(doc.children(cells[0])[0]), "i");

        let inner_seasons = doc.descendants_by_id_contains(section, "Saison_");
        assert_eq!(inner_seasons, vec![season]);
    }

    #[test]
    fn test_text_concatenates_subtree() {
        let doc = Document::parse("<p>avant <b>gras</b> après</p>");
        let paragraphs = doc.descendants_by_tag(NodeId(0), "p");
        assert_eq!(doc.text(paragraphs[0]), "avant gras après");
    }
}
