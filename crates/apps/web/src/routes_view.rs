use foundation::LatLng;
use protocol::{RouteLeg, TransferGroups};

pub const NO_ROUTES_HEADING: &str = "No Routes";

/// Render model of a routes response.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutesView {
    /// The response held no route groups.
    Empty,
    /// One section per transfer-count key, in response order.
    Groups(Vec<RouteGroupView>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteGroupView {
    pub heading: String,
    pub items: Vec<RouteItem>,
}

/// One itinerary line, e.g. `Lviv - Warsaw - London (1387km)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteItem {
    /// Position across all groups; hover events refer to items by it.
    pub index: usize,
    pub airports: Vec<String>,
    pub distance_km: i64,
    pub waypoints: Vec<LatLng>,
}

impl RouteItem {
    fn from_leg(index: usize, leg: &RouteLeg) -> Self {
        Self {
            index,
            airports: leg.nodes.iter().map(|n| n.airport_name.clone()).collect(),
            distance_km: leg.distance_km(),
            waypoints: leg.waypoints(),
        }
    }

    pub fn text(&self) -> String {
        format!("{} ({}km)", self.airports.join(" - "), self.distance_km)
    }
}

impl RoutesView {
    pub fn from_groups(groups: &TransferGroups) -> Self {
        if groups.is_empty() {
            return RoutesView::Empty;
        }

        let mut next_index = 0usize;
        let sections = groups
            .iter()
            .map(|group| {
                let items = group
                    .legs
                    .iter()
                    .map(|leg| {
                        let item = RouteItem::from_leg(next_index, leg);
                        next_index += 1;
                        item
                    })
                    .collect();
                RouteGroupView {
                    heading: format!("Routes with {} transfers:", group.transfers),
                    items,
                }
            })
            .collect();
        RoutesView::Groups(sections)
    }

    pub fn headings(&self) -> Vec<&str> {
        match self {
            RoutesView::Empty => vec![NO_ROUTES_HEADING],
            RoutesView::Groups(groups) => groups.iter().map(|g| g.heading.as_str()).collect(),
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &RouteItem> {
        let groups: &[RouteGroupView] = match self {
            RoutesView::Empty => &[],
            RoutesView::Groups(groups) => groups,
        };
        groups.iter().flat_map(|g| g.items.iter())
    }

    pub fn item(&self, index: usize) -> Option<&RouteItem> {
        self.items().find(|item| item.index == index)
    }

    /// Markup for the results region: dismiss button, then headings and lists.
    pub fn to_html(&self) -> String {
        let mut html = String::from(
            r#"<button type="button" class="close" data-dismiss="alert" aria-label="Close"><span aria-hidden="true">&times;</span></button>"#,
        );
        match self {
            RoutesView::Empty => {
                html.push_str(&format!("<h4>{NO_ROUTES_HEADING}</h4>"));
            }
            RoutesView::Groups(groups) => {
                for group in groups {
                    html.push_str(&format!("<h4>{}</h4><ul>", escape_html(&group.heading)));
                    for item in &group.items {
                        html.push_str(&format!(r#"<li data-route-index="{}">"#, item.index));
                        let last = item.airports.len().saturating_sub(1);
                        for (i, name) in item.airports.iter().enumerate() {
                            html.push_str(&format!("<span>{}</span>", escape_html(name)));
                            if i < last {
                                html.push_str(" - ");
                            }
                        }
                        html.push_str(&format!(" ({}km)</li>", item.distance_km));
                    }
                    html.push_str("</ul>");
                }
            }
        }
        html
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
