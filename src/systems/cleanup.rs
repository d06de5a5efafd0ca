//! Deferred game object destruction.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::gameobject::TransformHandle;
use crate::resources::sceneobjects::SceneObjects;
use crate::resources::transformtree::{TransformError, TransformTree};

/// Destroy `entity` together with its transform subtree. Returns every
/// despawned entity, descendants included.
pub fn destroy_game_object(world: &mut World, entity: Entity) -> Result<Vec<Entity>, TransformError> {
    let owners = match world.get::<TransformHandle>(entity).copied() {
        Some(handle) => {
            let mut owners = world.resource_mut::<TransformTree>().remove(handle.0)?;
            if !owners.contains(&entity) {
                owners.push(entity);
            }
            owners
        }
        None => vec![entity],
    };
    if let Some(mut objects) = world.get_resource_mut::<SceneObjects>() {
        for owner in &owners {
            objects.unregister(*owner);
        }
    }
    for owner in &owners {
        world.despawn(*owner);
    }
    debug!("destroyed {:?} ({} entities)", entity, owners.len());
    Ok(owners)
}

/// Destroy every object queued through
/// [`SceneObjects::request_destroy`].
pub fn apply_pending_destroy(world: &mut World) {
    let pending = match world.get_resource_mut::<SceneObjects>() {
        Some(mut objects) if objects.has_pending_destroy() => objects.take_pending_destroy(),
        _ => return,
    };
    for entity in pending {
        // already gone with an ancestor destroyed earlier in this pass
        if world.get_entity(entity).is_err() {
            continue;
        }
        if let Err(e) = destroy_game_object(world, entity) {
            warn!("failed to destroy {:?}: {}", entity, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gameobject::GameObjectBuilder;

    #[test]
    fn destroying_parent_despawns_subtree() {
        let mut world = World::new();
        let root = GameObjectBuilder::new("root").spawn(&mut world).unwrap();
        let child = GameObjectBuilder::new("child")
            .with_parent(root)
            .spawn(&mut world)
            .unwrap();
        let grandchild = GameObjectBuilder::new("grandchild")
            .with_parent(child)
            .spawn(&mut world)
            .unwrap();
        let other = GameObjectBuilder::new("other").spawn(&mut world).unwrap();

        let mut removed = destroy_game_object(&mut world, child).unwrap();
        removed.sort();
        let mut expected = vec![child, grandchild];
        expected.sort();
        assert_eq!(removed, expected);
        assert!(world.get_entity(grandchild).is_err());
        assert!(world.get_entity(root).is_ok());
        assert_eq!(world.resource::<SceneObjects>().snapshot(), vec![root, other]);
        assert_eq!(world.resource::<TransformTree>().len(), 2);
    }

    #[test]
    fn pending_destroy_waits_for_cleanup() {
        let mut world = World::new();
        let root = GameObjectBuilder::new("root").spawn(&mut world).unwrap();
        let child = GameObjectBuilder::new("child")
            .with_parent(root)
            .spawn(&mut world)
            .unwrap();
        {
            let mut objects = world.resource_mut::<SceneObjects>();
            objects.request_destroy(root);
            objects.request_destroy(child);
        }
        assert!(world.get_entity(root).is_ok());
        apply_pending_destroy(&mut world);
        assert!(world.get_entity(root).is_err());
        assert!(world.get_entity(child).is_err());
        assert!(world.resource::<SceneObjects>().is_empty());
    }
}
