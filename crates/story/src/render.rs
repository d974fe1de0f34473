use plate_core::{Editor, Node, Point};
use plate_format::{ToolbarState, ToolbarView};

/// Prints the toolbar as one line, active buttons in brackets.
#[derive(Debug, Default)]
pub struct TerminalToolbar {
    renders: usize,
}

impl TerminalToolbar {
    pub fn print(&self, state: &ToolbarState) {
        let buttons: Vec<String> = state
            .buttons
            .iter()
            .map(|button| {
                if button.active {
                    format!("[{}]", button.label)
                } else {
                    format!(" {} ", button.label)
                }
            })
            .collect();
        println!("toolbar #{}: {}", self.renders, buttons.join(""));
    }
}

impl ToolbarView for TerminalToolbar {
    fn render(&mut self, state: &ToolbarState) {
        self.renders += 1;
        self.print(state);
    }
}

/// One line per text block: `kind | text`, with marked runs wrapped in
/// `{marks:text}` and the selection edges shown as `|`.
pub fn render_document(editor: &Editor) -> String {
    let (start, end) = match editor.selection() {
        Some(selection) => {
            let (start, end) = selection.edges();
            (Some(start.clone()), Some(end.clone()))
        }
        None => (None, None),
    };

    let mut out = String::new();
    let mut path = Vec::new();
    render_children(&editor.doc().children, &mut path, 0, [&start, &end], &mut out);
    out.truncate(out.trim_end().len());
    out
}

fn render_children(
    children: &[Node],
    path: &mut Vec<usize>,
    depth: usize,
    edges: [&Option<Point>; 2],
    out: &mut String,
) {
    for (ix, node) in children.iter().enumerate() {
        path.push(ix);
        if let Node::Element(el) = node {
            out.push_str(&format!(
                "{:indent$}{:<12}| ",
                "",
                el.kind.name(),
                indent = depth * 2
            ));
            if el.is_text_block() {
                for (run_ix, child) in el.children.iter().enumerate() {
                    let Node::Text(text) = child else {
                        continue;
                    };
                    path.push(run_ix);
                    let names: Vec<&str> = text.marks.active().map(|mark| mark.name()).collect();
                    let body = with_carets(&text.text, path, edges);
                    if names.is_empty() {
                        out.push_str(&body);
                    } else {
                        out.push_str(&format!("{{{}:{body}}}", names.join(",")));
                    }
                    path.pop();
                }
                out.push('\n');
            } else {
                out.push('\n');
                render_children(&el.children, path, depth + 1, edges, out);
            }
        }
        path.pop();
    }
}

fn with_carets(text: &str, path: &[usize], edges: [&Option<Point>; 2]) -> String {
    let mut offsets: Vec<usize> = edges
        .iter()
        .filter_map(|edge| edge.as_ref())
        .filter(|point| point.path == path)
        .map(|point| point.offset.min(text.len()))
        .collect();
    offsets.dedup();

    let mut body = text.to_string();
    for offset in offsets.into_iter().rev() {
        body.insert(offset, '|');
    }
    body
}
