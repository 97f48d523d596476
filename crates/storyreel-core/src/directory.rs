//! Viewer-relative directory of authors and groups.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ids::{AuthorId, EntityId, GroupId};

/// What the viewer knows about a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// The author who created the group.
    pub creator_id: Option<AuthorId>,
    /// Authors administering the group.
    pub admin_ids: HashSet<AuthorId>,
}

impl GroupRecord {
    /// Whether `author` created or administers the group.
    #[must_use]
    pub fn is_managed_by(&self, author: AuthorId) -> bool {
        self.creator_id == Some(author) || self.admin_ids.contains(&author)
    }
}

/// Authors whose profiles the viewer can resolve and groups that still exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Resolvable author profiles.
    pub authors: HashSet<AuthorId>,
    /// Existing groups.
    pub groups: HashMap<GroupId, GroupRecord>,
}

/// Everything needed to decide which entities may appear in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerContext {
    /// The viewer.
    pub viewer_id: AuthorId,
    /// Known authors and groups.
    pub directory: Directory,
    /// Groups the viewer currently follows.
    pub followed_groups: HashSet<GroupId>,
}

impl ViewerContext {
    /// Creates a context with an empty directory and no follows.
    #[must_use]
    pub fn new(viewer_id: AuthorId) -> Self {
        Self {
            viewer_id,
            directory: Directory::default(),
            followed_groups: HashSet::new(),
        }
    }

    /// The viewer's own author entity.
    #[must_use]
    pub fn own_entity(&self) -> EntityId {
        EntityId::Author(self.viewer_id)
    }

    /// An author is eligible if the viewer can resolve the profile (the
    /// viewer can always resolve their own). A group is eligible if it
    /// still exists and the viewer follows it.
    #[must_use]
    pub fn is_eligible(&self, entity: &EntityId) -> bool {
        match entity {
            EntityId::Author(author) => {
                *author == self.viewer_id || self.directory.authors.contains(author)
            }
            EntityId::Group(group) => {
                self.directory.groups.contains_key(group) && self.followed_groups.contains(group)
            }
        }
    }

    /// Whether the viewer created or administers `group`.
    #[must_use]
    pub fn manages_group(&self, group: GroupId) -> bool {
        self.directory
            .groups
            .get(&group)
            .is_some_and(|record| record.is_managed_by(self.viewer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_followed_group_that_no_longer_exists_is_ineligible() {
        // Arrange
        let group = GroupId::new_v4();
        let mut context = ViewerContext::new(AuthorId::new_v4());
        context.followed_groups.insert(group);

        // Act / Assert
        assert!(!context.is_eligible(&EntityId::Group(group)));

        context
            .directory
            .groups
            .insert(group, GroupRecord::default());
        assert!(context.is_eligible(&EntityId::Group(group)));
    }

    #[test]
    fn test_viewer_is_always_eligible_as_author() {
        let viewer = AuthorId::new_v4();
        let context = ViewerContext::new(viewer);

        assert!(context.is_eligible(&EntityId::Author(viewer)));
        assert!(!context.is_eligible(&EntityId::Author(AuthorId::new_v4())));
    }

    #[test]
    fn test_manages_group_for_creator_and_admins() {
        // Arrange
        let viewer = AuthorId::new_v4();
        let created = GroupId::new_v4();
        let administered = GroupId::new_v4();
        let other = GroupId::new_v4();
        let mut context = ViewerContext::new(viewer);
        context.directory.groups.insert(
            created,
            GroupRecord {
                creator_id: Some(viewer),
                admin_ids: HashSet::new(),
            },
        );
        context.directory.groups.insert(
            administered,
            GroupRecord {
                creator_id: None,
                admin_ids: HashSet::from([viewer]),
            },
        );
        context
            .directory
            .groups
            .insert(other, GroupRecord::default());

        // Assert
        assert!(context.manages_group(created));
        assert!(context.manages_group(administered));
        assert!(!context.manages_group(other));
        assert!(!context.manages_group(GroupId::new_v4()));
    }
}
