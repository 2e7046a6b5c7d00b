/// Assignment of every graph node to exactly one community.
///
/// Community ids are contiguous, `0..community_count()`, and every id has at
/// least one member. Node positions follow the dense index order of the
/// graph the partition was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    assignments: Vec<usize>,
    count: usize,
}

impl Partition {
    pub(crate) fn new(assignments: Vec<usize>, count: usize) -> Self {
        debug_assert!(assignments.iter().all(|&c| c < count));
        Self { assignments, count }
    }

    pub fn community_of(&self, node: usize) -> usize {
        self.assignments[node]
    }

    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    pub fn community_count(&self) -> usize {
        self.count
    }

    pub fn node_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Member nodes grouped by community id.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.count];
        for (node, &c) in self.assignments.iter().enumerate() {
            groups[c].push(node);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_collect_members_in_node_order() {
        let partition = Partition::new(vec![0, 1, 0, 1, 0], 2);

        assert_eq!(partition.groups(), vec![vec![0, 2, 4], vec![1, 3]]);
        assert_eq!(partition.community_of(3), 1);
        assert_eq!(partition.community_count(), 2);
        assert_eq!(partition.node_count(), 5);
    }

    #[test]
    fn empty_partition_has_no_groups() {
        let partition = Partition::new(Vec::new(), 0);

        assert!(partition.is_empty());
        assert!(partition.groups().is_empty());
    }
}
