mod element;
mod expression;
mod mesh;
