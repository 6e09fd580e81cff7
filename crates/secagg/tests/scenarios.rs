use itertools::Itertools;
use num_bigint::{BigInt, BigUint};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use secagg::jl::{JoyeLibert, SchemeParametersBuilder};
use secagg::ss::{IntegerSharing, ShamirSharing, ThresholdConfig, ThresholdSharing};
use secagg::tjl::ThresholdJoyeLibert;
use secagg::ErrorKind;
use secagg_math::zp::FieldElement;
use std::error::Error;

#[test]
fn shamir_any_three_of_five() -> Result<(), Box<dyn Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let ss = ShamirSharing::new(64, ThresholdConfig::new(5, 3)?)?;
    let secret = FieldElement::from_u64(42, ss.field());
    let shares = ss.share(&secret, &mut rng)?;
    assert_eq!(shares.len(), 5);

    for subset in shares.iter().cloned().combinations(3) {
        let lagrange = ss.lagrange(&subset)?;
        assert_eq!(ss.reconstruct(&subset, &lagrange)?, secret);
    }

    let err = ss.lagrange(&shares[..2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientShares);
    let duplicated = vec![shares[0].clone(), shares[0].clone(), shares[1].clone()];
    assert_eq!(
        ss.lagrange(&duplicated).unwrap_err().kind(),
        ErrorKind::Consistency
    );
    Ok(())
}

#[test]
fn hundred_users_full_size() -> Result<(), Box<dyn Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let par = SchemeParametersBuilder::new()
        .set_users(100)
        .set_key_size(2048)
        .build_arc()?;
    let jl = JoyeLibert::new(&par);
    let (pp, server, users) = jl.setup(&mut rng)?;
    assert_eq!(pp.bits(), 1024);

    let x = BigUint::from(123456789u64);
    let ys = users
        .iter()
        .map(|u| jl.protect(&pp, u, 1, &x))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(ys[0].size_in_bytes(), 256);
    assert_eq!(jl.agg(&pp, &server, 1, &ys)?, x * 100u32);
    Ok(())
}

#[test]
fn integer_threshold_two_offline() -> Result<(), Box<dyn Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let par = SchemeParametersBuilder::new()
        .set_users(5)
        .set_threshold(3)
        .set_key_size(512)
        .build_arc()?;
    let tjl = ThresholdJoyeLibert::<IntegerSharing>::new(&par)?;
    let setup = tjl.setup(&mut rng)?;
    let pp = &setup.public;
    let inputs = [11u32, 22, 33, 44, 55].map(BigUint::from);

    let online = [2usize, 3, 5];
    let dropped = [1usize, 4];
    let ys = online
        .iter()
        .map(|&u| tjl.protect(pp, &setup.users[u - 1], 4, &inputs[u - 1]))
        .collect::<Result<Vec<_>, _>>()?;
    let zero_shares = online
        .iter()
        .map(|&u| tjl.share_protect(pp, &setup.shares_held_by(u, &dropped)?, 4))
        .collect::<Result<Vec<_>, _>>()?;
    let yzero = tjl.share_combine(pp, &zero_shares)?;
    assert_eq!(
        tjl.agg(pp, &setup.server, 4, &ys, Some(&yzero))?,
        BigUint::from(110u32)
    );

    // The integer shares of a key also reconstruct the key itself.
    let shares = setup.shares_held_by(1, &[4])?;
    assert_eq!(shares.len(), 1);
    let key_shares = (1..=3)
        .map(|holder| setup.shares_held_by(holder, &[4]).map(|mut s| s.remove(0)))
        .collect::<Result<Vec<_>, _>>()?;
    let lagrange = tjl.sharing().lagrange(&key_shares)?;
    let key: BigInt = tjl.sharing().reconstruct(&key_shares, &lagrange)?;
    assert_eq!(&key, setup.users[3].secret());
    Ok(())
}
