mod graph;

pub use graph::{
    Drawable, Material, Node, NodeId, PointLight, SceneGraph, Shape, SurfaceHit, Texture, TextureId, Transform,
    WorldLight,
};
