use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::domain::report::report_kind::ReportKind;
use crate::domain::reservation::reservation::{Connection, ReservationKind, ReservationNode};
use crate::domain::reservation::reservation_tree::ReservationKey;
use crate::domain::resource::allocation::CapacityKind;
use crate::domain::scheduler::allocation_session::{AllocationSession, TaskFailure};
use crate::domain::scheduler::reservation_task::ReservationTask;
use crate::domain::scheduler::strategy::evaluate_candidates;
use crate::domain::scheduler::strategy::strategy_trait::AllocationStrategy;
use crate::domain::specification::specification::{CompartmentSpecification, ParticipantSpecification, RoomSpecification};
use crate::domain::technology::{TechnologySet, format_technologies};
use crate::domain::time_slot::TimeSlot;

/// Upper bound of technology combinations tried when looking for a bridging room.
const MAX_TECHNOLOGY_COMBINATIONS: usize = 64;

/// An endpoint that takes part in the compartment.
#[derive(Debug, Clone)]
struct PlannedEndpoint {
    label: String,
    technologies: TechnologySet,
    count: u32,
    key: ReservationKey,
}

/// A room bridging all endpoints.
#[derive(Debug, Clone)]
struct Bridge {
    label: String,
    key: ReservationKey,
}

/// Allocates the endpoints of a group of participants and plans how they get connected: directly
/// when there are exactly two single endpoints sharing a technology, otherwise through one room.
#[derive(Debug)]
pub struct CompartmentStrategy<'s> {
    specification: &'s CompartmentSpecification,
}

impl<'s> CompartmentStrategy<'s> {
    pub fn new(specification: &'s CompartmentSpecification) -> Self {
        Self { specification }
    }

    fn endpoint_count(&self) -> usize {
        self.specification
            .participants
            .iter()
            .map(|participant| match participant {
                ParticipantSpecification::ExternalEndpoint { count, .. } => *count as usize,
                _ => 1,
            })
            .sum()
    }

    fn allocate_participant(
        &self,
        session: &mut AllocationSession<'_>,
        slot: TimeSlot,
        index: usize,
        participant: &ParticipantSpecification,
    ) -> Result<PlannedEndpoint, TaskFailure> {
        match participant {
            ParticipantSpecification::ExistingEndpoint { resource_id } => {
                let mut task = ReservationTask::for_endpoint(resource_id.clone(), resource_id.to_string(), slot);
                let key = ReservationTask::perform_child(session, &mut task)?;
                let technologies = session.resource(resource_id).map(|resource| resource.technologies).unwrap_or_default();
                Ok(PlannedEndpoint { label: resource_id.to_string(), technologies, count: 1, key })
            }
            ParticipantSpecification::LookupEndpoint { technologies } => self.lookup_endpoint(session, slot, technologies),
            ParticipantSpecification::ExternalEndpoint { technologies, count } => {
                let label = format!("external endpoint {}", index + 1);
                let key = session.create_reservation(ReservationNode::new(
                    slot,
                    ReservationKind::Endpoint { label: label.clone(), resource_id: None, technologies: technologies.clone(), count: *count },
                ));
                Ok(PlannedEndpoint { label, technologies: technologies.clone(), count: *count, key })
            }
        }
    }

    /// Finds a free terminal speaking one of `technologies` and allocates it.
    fn lookup_endpoint(&self, session: &mut AllocationSession<'_>, slot: TimeSlot, technologies: &TechnologySet) -> Result<PlannedEndpoint, TaskFailure> {
        session.begin_report(ReportKind::LookingUpEndpoint { technologies: technologies.clone() });
        let capability = format!("a terminal ({})", format_technologies(technologies));

        let eligible = session.find_resources(|resource| resource.terminal().is_some() && resource.supports_any(technologies));
        if eligible.is_empty() {
            let failure = session.fail(ReportKind::NoResourceWithCapability { capability });
            session.end_report_error();
            return Err(failure);
        }

        for candidate in evaluate_candidates(session, &slot, &eligible, CapacityKind::Exclusive) {
            let resource_id = candidate.resource_id;
            let mut task = ReservationTask::for_endpoint(resource_id.clone(), resource_id.to_string(), slot);
            if let Ok(key) = ReservationTask::perform_child(session, &mut task) {
                session.end_report();
                let technologies = session.resource(&resource_id).map(|resource| resource.technologies).unwrap_or_default();
                return Ok(PlannedEndpoint { label: resource_id.to_string(), technologies, count: 1, key });
            }
        }

        let failure = session.fail(ReportKind::NoAvailableResource { capability });
        session.end_report_error();
        Err(failure)
    }

    /// Plans the connections between `endpoints`, allocating a bridging room if needed.
    fn connect(&self, session: &mut AllocationSession<'_>, slot: TimeSlot, endpoints: &[PlannedEndpoint]) -> Result<(Vec<Connection>, Option<Bridge>), TaskFailure> {
        if let [first, second] = endpoints {
            session.begin_report(ReportKind::ConnectingDirectly { from: first.label.clone(), to: second.label.clone() });
            match direct_connection(first, second) {
                Ok(connection) => {
                    session.end_report();
                    return Ok((vec![connection], None));
                }
                Err(reason) => {
                    session.add_error_report(reason);
                    session.end_report_error();
                }
            }
        }

        let bridge = self.bridge_with_room(session, slot, endpoints)?;
        let room_technologies = room_technologies(session, bridge.key);
        let mut connections = Vec::new();
        for endpoint in endpoints {
            if let Some(technology) = endpoint.technologies.intersection(&room_technologies).next() {
                connections.push(Connection { from: endpoint.label.clone(), to: bridge.label.clone(), technology: *technology });
            }
        }
        Ok((connections, Some(bridge)))
    }

    /// Tries technology combinations (smallest first) until a room supporting one of them can be
    /// allocated. Each attempt is a child task, so a failed attempt leaves nothing behind.
    fn bridge_with_room(&self, session: &mut AllocationSession<'_>, slot: TimeSlot, endpoints: &[PlannedEndpoint]) -> Result<Bridge, TaskFailure> {
        let groups: Vec<TechnologySet> = endpoints.iter().map(|endpoint| endpoint.technologies.clone()).collect();
        let all_technologies: TechnologySet = groups.iter().flatten().copied().collect();

        let bridgeable: Vec<TechnologySet> = technology_combinations(&groups)
            .into_iter()
            .filter(|combination| !session.find_resources(|resource| resource.room_provider().is_some() && resource.supports_all(combination)).is_empty())
            .collect();
        if bridgeable.is_empty() {
            return Err(session.fail(ReportKind::NoBridgingRoom { technologies: all_technologies }));
        }

        let participant_count: u32 = endpoints.iter().map(|endpoint| endpoint.count).sum();
        let mut last_failure = None;
        for technologies in bridgeable {
            session.begin_report(ReportKind::BridgingWithRoom { technologies: technologies.clone() });
            let room_specification = RoomSpecification { participant_count, technologies, resource_id: None, aliases: Vec::new() };
            let mut task = ReservationTask::for_room(&room_specification, slot);

            match ReservationTask::perform_child(session, &mut task) {
                Ok(key) => {
                    session.end_report();
                    let label = match session.reservations.get(key).and_then(|node| node.kind.resource_id()) {
                        Some(resource_id) => format!("room {}", resource_id),
                        None => "room".to_string(),
                    };
                    return Ok(Bridge { label, key });
                }
                Err(failure) => {
                    session.end_report_error();
                    last_failure = Some(failure);
                }
            }
        }

        match last_failure {
            Some(failure) => Err(failure),
            None => Err(session.fail(ReportKind::NoBridgingRoom { technologies: all_technologies })),
        }
    }

    /// Checks with a union-find over endpoints (and the room) that every endpoint is reachable.
    fn verify_connectivity(
        &self,
        session: &mut AllocationSession<'_>,
        endpoints: &[PlannedEndpoint],
        bridge: Option<&Bridge>,
        connections: &[Connection],
    ) -> Result<(), TaskFailure> {
        let mut labels: Vec<&str> = endpoints.iter().map(|endpoint| endpoint.label.as_str()).collect();
        if let Some(bridge) = bridge {
            labels.push(bridge.label.as_str());
        }
        let index_of = |label: &str| labels.iter().position(|known| *known == label);

        let mut dsu = QuickUnionUf::<UnionBySize>::new(labels.len());
        for connection in connections {
            if let (Some(from), Some(to)) = (index_of(&connection.from), index_of(&connection.to)) {
                dsu.union(from, to);
            }
        }

        let root = dsu.find(0);
        let unreachable: Vec<String> = (0..endpoints.len()).filter(|index| dsu.find(*index) != root).map(|index| endpoints[index].label.clone()).collect();
        if !unreachable.is_empty() {
            return Err(session.fail(ReportKind::ParticipantsNotConnected { unreachable }));
        }
        Ok(())
    }
}

impl<'s> AllocationStrategy for CompartmentStrategy<'s> {
    fn task_report(&self) -> ReportKind {
        ReportKind::AllocatingCompartment { participant_count: self.specification.participants.len() }
    }

    fn allocate(&self, session: &mut AllocationSession<'_>, slot: TimeSlot) -> Result<ReservationKey, TaskFailure> {
        if self.endpoint_count() < 2 {
            return Err(session.fail(ReportKind::TooFewParticipants { participant_count: self.endpoint_count() }));
        }

        let mut endpoints = Vec::new();
        for (index, participant) in self.specification.participants.iter().enumerate() {
            endpoints.push(self.allocate_participant(session, slot, index, participant)?);
        }

        let (connections, bridge) = self.connect(session, slot, &endpoints)?;
        self.verify_connectivity(session, &endpoints, bridge.as_ref(), &connections)?;

        let compartment = session.create_reservation(ReservationNode::new(slot, ReservationKind::Compartment { connections }));
        for endpoint in &endpoints {
            session.attach_child(compartment, endpoint.key);
        }
        if let Some(bridge) = bridge {
            session.attach_child(compartment, bridge.key);
        }

        log::debug!("Compartment with {} endpoints allocated for {}.", endpoints.len(), slot);
        Ok(compartment)
    }
}

/// Connects two endpoints directly if both are single endpoints sharing a technology.
fn direct_connection(first: &PlannedEndpoint, second: &PlannedEndpoint) -> Result<Connection, ReportKind> {
    if first.count > 1 || second.count > 1 {
        return Err(ReportKind::ConnectionToMultipleEndpoints { from: first.label.clone(), to: second.label.clone() });
    }
    match first.technologies.intersection(&second.technologies).next() {
        Some(technology) => Ok(Connection { from: first.label.clone(), to: second.label.clone(), technology: *technology }),
        None => Err(ReportKind::ConnectionIncompatible { from: first.label.clone(), to: second.label.clone() }),
    }
}

fn room_technologies(session: &AllocationSession<'_>, room: ReservationKey) -> TechnologySet {
    match session.reservations.get(room).map(|node| &node.kind) {
        Some(ReservationKind::Room { technologies, .. }) => technologies.clone(),
        _ => TechnologySet::new(),
    }
}

/// Every set built by choosing one technology per group, deduplicated, smallest sets first.
/// An empty group makes bridging impossible and yields no combination.
fn technology_combinations(groups: &[TechnologySet]) -> Vec<TechnologySet> {
    let mut combinations: Vec<TechnologySet> = vec![TechnologySet::new()];
    for group in groups {
        let mut next: Vec<TechnologySet> = Vec::new();
        for combination in &combinations {
            for technology in group {
                let mut extended = combination.clone();
                extended.insert(*technology);
                if !next.contains(&extended) {
                    next.push(extended);
                }
            }
        }
        next.truncate(MAX_TECHNOLOGY_COMBINATIONS);
        combinations = next;
    }
    combinations.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    combinations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::technology::Technology;

    #[test]
    fn test_combinations_prefer_shared_technologies() {
        let groups = vec![TechnologySet::from([Technology::H323, Technology::Sip]), TechnologySet::from([Technology::Sip])];
        let combinations = technology_combinations(&groups);
        assert_eq!(combinations[0], TechnologySet::from([Technology::Sip]));
        assert_eq!(combinations[1], TechnologySet::from([Technology::H323, Technology::Sip]));
        assert_eq!(combinations.len(), 2);
    }

    #[test]
    fn test_empty_group_yields_no_combination() {
        let groups = vec![TechnologySet::from([Technology::H323]), TechnologySet::new()];
        assert!(technology_combinations(&groups).is_empty());
    }
}
