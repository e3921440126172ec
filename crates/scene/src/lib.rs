mod trs;
pub use trs::Trs;

mod transform;
pub use transform::{
    append_child, is_leaf, is_root, parent, position, remove_from_parent, rotation, scale,
    set_position, set_rotation, set_scale, Transform, TransformSpace,
};

mod iter;
pub use iter::{ancestors, children, children_recursive, AncestorIter, ChildrenIter, RecursiveChildrenIter};
