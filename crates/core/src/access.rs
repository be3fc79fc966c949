//! Access-scope resolver.
//!
//! Decides whether an identity may read or write an entity. Rights flow
//! strictly downward from `Project.owner_id`: a [`Resource`] carries the
//! entity together with its loaded containment chain, and the resolver walks
//! that chain up to the owning project. No entity below a project has its own
//! access list.
//!
//! The functions here are pure and total. Every unknown state (no identity,
//! a chain whose links do not match) resolves to "deny".

use crate::entities::{Annotation, Dataset, Image, Project};
use crate::identity::Identity;

/// An entity plus the ancestors needed to resolve its owner.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Project(&'a Project),
    Dataset {
        dataset: &'a Dataset,
        project: &'a Project,
    },
    Image {
        image: &'a Image,
        dataset: &'a Dataset,
        project: &'a Project,
    },
    Annotation {
        annotation: &'a Annotation,
        image: &'a Image,
        dataset: &'a Dataset,
        project: &'a Project,
    },
}

impl<'a> Resource<'a> {
    /// Entity kind, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Project(_) => "Project",
            Self::Dataset { .. } => "Dataset",
            Self::Image { .. } => "Image",
            Self::Annotation { .. } => "Annotation",
        }
    }

    /// Identifier of the entity itself (not its ancestors).
    pub fn id(&self) -> &'a str {
        match self {
            Self::Project(p) => &p.id,
            Self::Dataset { dataset, .. } => &dataset.id,
            Self::Image { image, .. } => &image.id,
            Self::Annotation { annotation, .. } => &annotation.id,
        }
    }

    /// The immediate container, or `None` for a project.
    pub fn parent(&self) -> Option<Resource<'a>> {
        match *self {
            Self::Project(_) => None,
            Self::Dataset { project, .. } => Some(Resource::Project(project)),
            Self::Image {
                dataset, project, ..
            } => Some(Resource::Dataset { dataset, project }),
            Self::Annotation {
                image,
                dataset,
                project,
                ..
            } => Some(Resource::Image {
                image,
                dataset,
                project,
            }),
        }
    }

    /// Whether this entity's stored parent id points at `parent`.
    fn is_contained_in(&self, parent: &Resource<'_>) -> bool {
        match self {
            Self::Project(_) => false,
            Self::Dataset { dataset, .. } => dataset.project_id == parent.id(),
            Self::Image { image, .. } => image.dataset_id == parent.id(),
            Self::Annotation { annotation, .. } => annotation.image_id == parent.id(),
        }
    }

    /// Walk up the containment chain to the root project.
    ///
    /// Returns `None` if any link in the chain is inconsistent.
    pub fn owning_project(&self) -> Option<&'a Project> {
        match self.parent() {
            None => match *self {
                Self::Project(project) => Some(project),
                _ => None,
            },
            Some(parent) => {
                if !self.is_contained_in(&parent) {
                    return None;
                }
                parent.owning_project()
            }
        }
    }

    /// The id of the identity that owns this entity, derived from the root project.
    pub fn effective_owner(&self) -> Option<&'a str> {
        self.owning_project().map(|p| p.owner_id.as_str())
    }
}

/// Whether `identity` may read `resource`.
pub fn can_read(identity: Option<&Identity>, resource: &Resource<'_>) -> bool {
    is_owner(identity, resource)
}

/// Whether `identity` may create under, modify, or delete `resource`.
///
/// Single-owner model: write rights coincide with read rights.
pub fn can_write(identity: Option<&Identity>, resource: &Resource<'_>) -> bool {
    is_owner(identity, resource)
}

fn is_owner(identity: Option<&Identity>, resource: &Resource<'_>) -> bool {
    match (identity, resource.effective_owner()) {
        (Some(identity), Some(owner)) => identity.id == owner,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;

    use super::*;
    use crate::entities::ProjectStatus;

    fn identity(id: &str) -> Identity {
        let now = Utc::now();
        Identity {
            id: id.into(),
            email: format!("{id}@example.com"),
            display_name: None,
            issued_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    fn project(id: &str, owner: &str) -> Project {
        let now = Utc::now();
        Project {
            id: id.into(),
            owner_id: owner.into(),
            name: format!("Project {id}"),
            description: None,
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn dataset(id: &str, project_id: &str) -> Dataset {
        let now = Utc::now();
        Dataset {
            id: id.into(),
            project_id: project_id.into(),
            name: format!("Dataset {id}"),
            description: None,
            total_images: 0,
            annotated_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn image(id: &str, dataset_id: &str) -> Image {
        Image {
            id: id.into(),
            dataset_id: dataset_id.into(),
            uri: format!("/data/{id}.png"),
            metadata: json!({}),
            created_at: Utc::now(),
        }
    }

    fn annotation(id: &str, image_id: &str, author: &str) -> Annotation {
        let now = Utc::now();
        Annotation {
            id: id.into(),
            image_id: image_id.into(),
            author_id: author.into(),
            payload: json!({"label": "car"}),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_owner_can_read_and_write_project() {
        let a = identity("a");
        let p = project("p1", "a");
        let r = Resource::Project(&p);
        assert!(can_read(Some(&a), &r));
        assert!(can_write(Some(&a), &r));
    }

    #[test]
    fn test_other_identities_are_denied_at_every_level() {
        let a = identity("a");
        let b = identity("b");
        let p = project("p1", &a.id);
        let d = dataset("d1", "p1");
        let i = image("i1", "d1");
        let n = annotation("n1", "i1", &a.id);

        let resources = [
            Resource::Project(&p),
            Resource::Dataset {
                dataset: &d,
                project: &p,
            },
            Resource::Image {
                image: &i,
                dataset: &d,
                project: &p,
            },
            Resource::Annotation {
                annotation: &n,
                image: &i,
                dataset: &d,
                project: &p,
            },
        ];
        for r in &resources {
            assert!(can_read(Some(&a), r), "owner must read {}", r.kind());
            assert!(!can_read(Some(&b), r), "stranger must not read {}", r.kind());
            assert!(!can_write(Some(&b), r), "stranger must not write {}", r.kind());
        }
    }

    #[test]
    fn test_absent_identity_is_always_denied() {
        let p = project("p1", "a");
        let d = dataset("d1", "p1");
        let r = Resource::Dataset {
            dataset: &d,
            project: &p,
        };
        assert!(!can_read(None, &Resource::Project(&p)));
        assert!(!can_write(None, &Resource::Project(&p)));
        assert!(!can_read(None, &r));
        assert!(!can_write(None, &r));
    }

    #[test]
    fn test_dataset_rights_equal_containing_project_rights() {
        let ids = [identity("a"), identity("b")];
        let projects = [project("p1", "a"), project("p2", "b")];
        for p in &projects {
            let d = dataset("d", &p.id);
            let dr = Resource::Dataset {
                dataset: &d,
                project: p,
            };
            let pr = Resource::Project(p);
            for who in &ids {
                assert_eq!(can_write(Some(who), &dr), can_write(Some(who), &pr));
                assert_eq!(can_read(Some(who), &dr), can_read(Some(who), &pr));
            }
        }
    }

    #[test]
    fn test_annotation_author_does_not_grant_access() {
        // An annotation authored by "b" inside a project owned by "a" is
        // still governed by the project owner.
        let a = identity("a");
        let b = identity("b");
        let p = project("p1", "a");
        let d = dataset("d1", "p1");
        let i = image("i1", "d1");
        let n = annotation("n1", "i1", "b");
        let r = Resource::Annotation {
            annotation: &n,
            image: &i,
            dataset: &d,
            project: &p,
        };
        assert!(can_write(Some(&a), &r));
        assert!(!can_read(Some(&b), &r));
    }

    #[test]
    fn test_broken_chain_denies_even_the_owner() {
        let a = identity("a");
        let p = project("p1", "a");
        // Dataset claims to live in another project.
        let d = dataset("d1", "p-other");
        let r = Resource::Dataset {
            dataset: &d,
            project: &p,
        };
        assert_eq!(r.owning_project(), None);
        assert!(!can_read(Some(&a), &r));

        let d_ok = dataset("d1", "p1");
        let i = image("i1", "d-other");
        let r = Resource::Image {
            image: &i,
            dataset: &d_ok,
            project: &p,
        };
        assert!(!can_write(Some(&a), &r));
    }

    #[test]
    fn test_effective_owner_is_root_owner() {
        let p = project("p1", "owner");
        let d = dataset("d1", "p1");
        let i = image("i1", "d1");
        let r = Resource::Image {
            image: &i,
            dataset: &d,
            project: &p,
        };
        assert_eq!(r.effective_owner(), Some("owner"));
        assert_eq!(r.kind(), "Image");
        assert_eq!(r.id(), "i1");
    }
}
