use foundation::{LatLngBounds, LocationPoint};

/// Which end of the trip a location is bound to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    From,
    To,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::From, Role::To];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::From => "from",
            Role::To => "to",
        }
    }

    /// Role for an input element id; only `from` and `to` carry one.
    pub fn from_input(input: &str) -> Option<Role> {
        match input {
            "from" => Some(Role::From),
            "to" => Some(Role::To),
            _ => None,
        }
    }

    /// Element id of the role's text input.
    pub fn input_id(self) -> &'static str {
        self.as_str()
    }

    /// Form field name of the role's airport list.
    pub fn airport_field(self) -> &'static str {
        match self {
            Role::From => "from_airport",
            Role::To => "to_airport",
        }
    }
}

/// Origin and destination currently chosen by the user.
///
/// Holds at most one point per role, so never more than two entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundPointSet {
    from: Option<LocationPoint>,
    to: Option<LocationPoint>,
}

impl BoundPointSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, role: Role) -> &mut Option<LocationPoint> {
        match role {
            Role::From => &mut self.from,
            Role::To => &mut self.to,
        }
    }

    /// Binds `point` to `role`, returning the point it replaced.
    pub fn bind(&mut self, role: Role, point: LocationPoint) -> Option<LocationPoint> {
        self.slot(role).replace(point)
    }

    pub fn release(&mut self, role: Role) -> Option<LocationPoint> {
        self.slot(role).take()
    }

    pub fn get(&self, role: Role) -> Option<&LocationPoint> {
        match role {
            Role::From => self.from.as_ref(),
            Role::To => self.to.as_ref(),
        }
    }

    pub fn len(&self) -> usize {
        usize::from(self.from.is_some()) + usize::from(self.to.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.len() == 2
    }

    pub fn clear(&mut self) {
        self.from = None;
        self.to = None;
    }

    /// Viewport holding both ends; `None` until both roles are bound.
    pub fn fit_bounds(&self) -> Option<LatLngBounds> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => LatLngBounds::from_points([from.position, to.position]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundPointSet, Role};
    use foundation::{LatLng, LocationPoint};

    fn point(label: &str, lat: f64, lng: f64) -> LocationPoint {
        LocationPoint::new(label, LatLng::new(lat, lng))
    }

    #[test]
    fn only_from_and_to_inputs_have_roles() {
        assert_eq!(Role::from_input("from"), Some(Role::From));
        assert_eq!(Role::from_input("to"), Some(Role::To));
        assert_eq!(Role::from_input("passengers"), None);
        assert_eq!(Role::To.airport_field(), "to_airport");
    }

    #[test]
    fn one_bound_role_never_fits() {
        let mut set = BoundPointSet::new();
        set.bind(Role::From, point("London", 51.5, -0.12));
        assert_eq!(set.len(), 1);
        assert!(set.fit_bounds().is_none());
    }

    #[test]
    fn both_roles_fit_both_points() {
        let mut set = BoundPointSet::new();
        set.bind(Role::To, point("Paris", 48.85, 2.35));
        set.bind(Role::From, point("London", 51.5, -0.12));
        let b = set.fit_bounds().unwrap();
        assert!(b.contains(LatLng::new(48.85, 2.35)));
        assert!(b.contains(LatLng::new(51.5, -0.12)));
    }

    #[test]
    fn rebinding_replaces_and_release_removes() {
        let mut set = BoundPointSet::new();
        set.bind(Role::From, point("London", 51.5, -0.12));
        let old = set.bind(Role::From, point("Lviv", 49.84, 24.03));
        assert_eq!(old.unwrap().label, "London");
        assert_eq!(set.len(), 1);
        assert_eq!(set.release(Role::From).unwrap().label, "Lviv");
        assert!(set.is_empty());
        assert!(set.release(Role::From).is_none());
    }
}
