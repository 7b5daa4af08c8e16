use tch::Tensor;

pub trait ToTensor {
    fn to_tensor(&self) -> Tensor;
}

/// A single state, `[len]`.
impl ToTensor for [f32] {
    fn to_tensor(&self) -> Tensor {
        Tensor::from_slice(self)
    }
}

/// A batch of fixed-width states, `[len, N]`.
impl<const N: usize> ToTensor for [[f32; N]] {
    fn to_tensor(&self) -> Tensor {
        let flat: Vec<f32> = self.iter().flatten().copied().collect();
        Tensor::from_slice(&flat).reshape([self.len() as i64, N as i64])
    }
}
