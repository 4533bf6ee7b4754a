//! Round-robin distribution planning.

use serde::Serialize;

use agentdesk_core::{Agent, AgentId, LeadRecord, TaskAssignment};

use crate::error::PlanningError;

/// The tasks destined for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub tasks: Vec<TaskAssignment>,
}

/// A partition of one batch across an agent snapshot, in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    buckets: Vec<Bucket>,
    /// Buckets of the same batch committed by an earlier, aborted run.
    already_committed: usize,
}

impl Plan {
    /// Buckets in commit order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Number of buckets left to commit.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets committed for this batch before this plan was split off.
    pub fn already_committed(&self) -> usize {
        self.already_committed
    }

    /// Buckets in the whole batch, including those already committed.
    pub fn total_buckets(&self) -> usize {
        self.already_committed + self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of tasks across all buckets.
    pub fn task_count(&self) -> usize {
        self.buckets.iter().map(|b| b.tasks.len()).sum()
    }

    /// The buckets from `index` onward, for resuming an aborted commit.
    pub fn remaining_from(&self, index: usize) -> Plan {
        Plan {
            buckets: self.buckets.get(index..).unwrap_or_default().to_vec(),
            already_committed: self.already_committed + index.min(self.buckets.len()),
        }
    }
}

/// Assign record `i` to agent `i mod M`, translating each record into the
/// task shape stored on agents.
pub fn plan(records: &[LeadRecord], agents: &[Agent]) -> Result<Plan, PlanningError> {
    if agents.is_empty() {
        return Err(PlanningError::NoWorkers);
    }
    if records.is_empty() {
        return Err(PlanningError::NoRecords);
    }

    let per_agent = records.len().div_ceil(agents.len());
    let mut buckets: Vec<Bucket> = agents
        .iter()
        .map(|agent| Bucket {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            tasks: Vec::with_capacity(per_agent),
        })
        .collect();

    for (index, record) in records.iter().enumerate() {
        buckets[index % agents.len()].tasks.push(to_assignment(record));
    }

    Ok(Plan {
        buckets,
        already_committed: 0,
    })
}

fn to_assignment(record: &LeadRecord) -> TaskAssignment {
    TaskAssignment {
        first_name: record.first_name.clone(),
        mob_number: record.phone.clone(),
        notes: record.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentdesk_core::AgentRegistration;

    fn agents(n: usize) -> Vec<Agent> {
        (1..=n)
            .map(|i| {
                Agent::register(AgentRegistration::new(format!("W{i}"), format!("w{i}@x.io"), "0"))
                    .with_id(AgentId::new(format!("w{i}")))
            })
            .collect()
    }

    fn records(n: usize) -> Vec<LeadRecord> {
        (0..n)
            .map(|i| LeadRecord::new(format!("R{i}"), i.to_string(), format!("n{i}")))
            .collect()
    }

    #[test]
    fn test_three_records_two_agents() {
        let records = vec![
            LeadRecord::new("A", "1", "n1"),
            LeadRecord::new("B", "2", "n2"),
            LeadRecord::new("C", "3", "n3"),
        ];
        let plan = plan(&records, &agents(2)).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.buckets()[0].agent_id, AgentId::new("w1"));
        assert_eq!(
            plan.buckets()[0].tasks,
            vec![
                TaskAssignment::new("A", "1", "n1"),
                TaskAssignment::new("C", "3", "n3"),
            ]
        );
        assert_eq!(plan.buckets()[1].agent_id, AgentId::new("w2"));
        assert_eq!(plan.buckets()[1].tasks, vec![TaskAssignment::new("B", "2", "n2")]);
    }

    #[test]
    fn test_no_agents() {
        assert_eq!(plan(&records(3), &[]), Err(PlanningError::NoWorkers));
    }

    #[test]
    fn test_no_records() {
        assert_eq!(plan(&[], &agents(2)), Err(PlanningError::NoRecords));
    }

    #[test]
    fn test_no_agents_checked_before_no_records() {
        assert_eq!(plan(&[], &[]), Err(PlanningError::NoWorkers));
    }

    #[test]
    fn test_buckets_balanced_and_lossless() {
        for n in 1..=40 {
            for m in 1..=9 {
                let records = records(n);
                let plan = plan(&records, &agents(m)).unwrap();

                assert_eq!(plan.len(), m);
                assert_eq!(plan.task_count(), n);

                let floor = n / m;
                let ceil = n.div_ceil(m);
                for bucket in plan.buckets() {
                    let size = bucket.tasks.len();
                    assert!(size == floor || size == ceil, "n={n} m={m} size={size}");
                }

                let mut seen: Vec<&str> = plan
                    .buckets()
                    .iter()
                    .flat_map(|b| b.tasks.iter().map(|t| t.first_name.as_str()))
                    .collect();
                seen.sort_unstable();
                seen.dedup();
                assert_eq!(seen.len(), n, "duplicate or dropped record, n={n} m={m}");
            }
        }
    }

    #[test]
    fn test_order_preserved_within_bucket() {
        let records = records(17);
        let plan = plan(&records, &agents(4)).unwrap();

        for (slot, bucket) in plan.buckets().iter().enumerate() {
            let expected: Vec<TaskAssignment> = records
                .iter()
                .skip(slot)
                .step_by(4)
                .map(to_assignment)
                .collect();
            assert_eq!(bucket.tasks, expected);
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let records = records(23);
        let agents = agents(5);
        assert_eq!(plan(&records, &agents), plan(&records, &agents));
    }

    #[test]
    fn test_fewer_records_than_agents_leaves_empty_buckets() {
        let plan = plan(&records(2), &agents(4)).unwrap();
        let sizes: Vec<usize> = plan.buckets().iter().map(|b| b.tasks.len()).collect();
        assert_eq!(sizes, vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_remaining_from() {
        let plan = plan(&records(6), &agents(3)).unwrap();
        assert_eq!(plan.total_buckets(), 3);
        assert_eq!(plan.already_committed(), 0);

        let rest = plan.remaining_from(1);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest.buckets()[0].agent_id, AgentId::new("w2"));
        assert_eq!(rest.already_committed(), 1);
        assert_eq!(rest.total_buckets(), 3);

        let last = rest.remaining_from(1);
        assert_eq!(last.already_committed(), 2);
        assert_eq!(last.total_buckets(), 3);

        assert!(plan.remaining_from(3).is_empty());
        assert_eq!(plan.remaining_from(7).total_buckets(), 3);
    }
}
