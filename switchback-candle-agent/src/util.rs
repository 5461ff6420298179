//! Utilities.
use anyhow::{Context, Result};
use std::convert::TryFrom;
use candle_core::{Tensor, WithDType};
use candle_nn::VarMap;
use log::trace;
use num_traits::AsPrimitive;

/// Converts a vector to a one dimensional tensor, casting its elements.
///
/// When `add_batch_dim` is `true`, a batch dimension of size 1 is prepended.
pub fn vec_to_tensor<T1, T2>(v: Vec<T1>, add_batch_dim: bool) -> Result<Tensor>
where
    T1: AsPrimitive<T2>,
    T2: WithDType,
{
    let v = v.iter().map(|e| e.as_()).collect::<Vec<_>>();
    let t: Tensor = TryFrom::<Vec<T2>>::try_from(v)?;

    match add_batch_dim {
        true => Ok(t.unsqueeze(0)?),
        false => Ok(t),
    }
}

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("track variables with tau = {}", tau);
    let dest = dest.data().lock().unwrap();
    let src = src.data().lock().unwrap();

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .with_context(|| format!("variable {} is missing in the source", k_dest))?;
        let t_src = (tau * v_src.as_tensor())?;
        let t_dest = ((1.0 - tau) * v_dest.as_tensor())?;
        v_dest.set(&(t_src + t_dest)?)?;
    }

    Ok(())
}

#[test]
fn test_vec_to_tensor() -> Result<()> {
    let t = vec_to_tensor::<i8, f32>(vec![0i8, 1, 1], true)?;
    assert_eq!(t.dims(), &[1, 3]);
    assert_eq!(t.squeeze(0)?.to_vec1::<f32>()?, vec![0f32, 1.0, 1.0]);
    Ok(())
}

#[test]
fn test_track() -> Result<()> {
    use candle_core::{DType, Device, Tensor};
    use candle_nn::Init;

    let tau = 0.7;
    let t_src = Tensor::from_slice(&[1.0f32, 2.0, 3.0], (3,), &Device::Cpu)?;
    let t_dest = Tensor::from_slice(&[4.0f32, 5.0, 6.0], (3,), &Device::Cpu)?;
    let t = ((tau * &t_src)? + ((1.0 - tau) * &t_dest)?)?;

    let init = Init::Const(0.0);
    let vm_src = {
        let vm = VarMap::new();
        vm.get((3,), "var1", init, DType::F32, &Device::Cpu)?;
        vm.data().lock().unwrap().get("var1").unwrap().set(&t_src)?;
        vm
    };
    let vm_dest = {
        let vm = VarMap::new();
        vm.get((3,), "var1", init, DType::F32, &Device::Cpu)?;
        vm.data()
            .lock()
            .unwrap()
            .get("var1")
            .unwrap()
            .set(&t_dest)?;
        vm
    };
    track(&vm_dest, &vm_src, tau)?;

    let t_ = vm_dest
        .data()
        .lock()
        .unwrap()
        .get("var1")
        .unwrap()
        .as_tensor()
        .clone();

    assert!((t - t_)?.abs()?.sum(0)?.to_scalar::<f32>()? < 1e-6);

    Ok(())
}
