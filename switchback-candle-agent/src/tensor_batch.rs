use candle_core::{Device, IndexOp, Tensor};
use switchback_core::generic_replay_buffer::BatchBase;

/// A buffer of transitions stacked along the first axis of a [`Tensor`].
///
/// The buffer lives on the CPU. Batches sampled from it are moved to the
/// device of the model by the agent.
///
/// [`Tensor`]: https://docs.rs/candle-core/0.8.4/candle_core/struct.Tensor.html
#[derive(Clone, Debug)]
pub struct TensorBatch {
    buf: Option<Tensor>,
    capacity: usize,
}

impl TensorBatch {
    /// Wraps a tensor whose first dimension is the batch dimension.
    pub fn from_tensor(t: Tensor) -> Self {
        let capacity = t.dims()[0];
        Self {
            buf: Some(t),
            capacity,
        }
    }
}

impl BatchBase for TensorBatch {
    fn new(capacity: usize) -> Self {
        Self {
            buf: None,
            capacity,
        }
    }

    /// Pushes given data.
    ///
    /// The internal buffer is lazily initialized with the shape
    /// `[capacity, data.buf.dims()[1..]]` on the first push.
    fn push(&mut self, index: usize, data: Self) {
        let data = match data.buf {
            Some(data) => data,
            None => return,
        };

        let batch_size = data.dims()[0];
        if batch_size == 0 {
            return;
        }

        if self.buf.is_none() {
            let mut shape = data.dims().to_vec();
            shape[0] = self.capacity;
            self.buf = Some(Tensor::zeros(shape, data.dtype(), &Device::Cpu).unwrap());
        }
        let buf = self.buf.as_mut().unwrap();

        if index + batch_size > self.capacity {
            // Wrap around the end of the buffer.
            let head = self.capacity - index;
            let data1 = data.i((..head,)).unwrap();
            let data2 = data.i((head..,)).unwrap();
            buf.slice_set(&data1, 0, index).unwrap();
            buf.slice_set(&data2, 0, 0).unwrap();
        } else {
            buf.slice_set(&data, 0, index).unwrap();
        }
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        let capacity = ixs.len();
        let ixs = {
            let device = self.buf.as_ref().unwrap().device();
            let ixs = ixs.iter().map(|x| *x as u32).collect();
            Tensor::from_vec(ixs, &[capacity], device).unwrap()
        };
        let buf = Some(self.buf.as_ref().unwrap().index_select(&ixs, 0).unwrap());
        Self { buf, capacity }
    }
}

impl From<TensorBatch> for Tensor {
    fn from(b: TensorBatch) -> Self {
        b.buf.unwrap()
    }
}
