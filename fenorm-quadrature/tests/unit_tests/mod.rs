mod simplex;
mod tensor;
