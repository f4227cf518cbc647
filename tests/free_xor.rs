use polygarble::{
    circuit::{BooleanCircuit, Gate},
    free_xor::FreeXorCircuit,
    garble::{Error, GarbledBooleanCircuit},
};
use proptest::{prelude::*, sample::Index};

/// Builds a circuit from random gate choices, each gate reading from wires
/// defined before it.
fn random_circuit(
    input_gates: Vec<usize>,
    choices: &[(u8, Index, Index)],
    outputs: &[Index],
) -> BooleanCircuit {
    let n_inputs: usize = input_gates.iter().sum();
    let gates: Vec<Gate> = choices
        .iter()
        .enumerate()
        .map(|(g, (kind, x, y))| {
            let (x, y) = (x.index(n_inputs + g), y.index(n_inputs + g));
            match kind % 4 {
                0 => Gate::Xor(x, y),
                1 => Gate::And(x, y),
                2 => Gate::Or(x, y),
                _ => Gate::Not(x),
            }
        })
        .collect();
    let n_wires = n_inputs + gates.len();
    BooleanCircuit {
        input_gates,
        gates,
        output_gates: outputs.iter().map(|o| o.index(n_wires)).collect(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn garbled_evaluation_matches_plaintext(
        choices in prop::collection::vec((any::<u8>(), any::<Index>(), any::<Index>()), 1..40),
        outputs in prop::collection::vec(any::<Index>(), 1..8),
        a in prop::collection::vec(any::<bool>(), 3),
        b in prop::collection::vec(any::<bool>(), 2),
    ) {
        let plain = random_circuit(vec![3, 2], &choices, &outputs);
        let expected: Vec<u8> = plain.eval(&[a.as_slice(), b.as_slice()]).into_iter().map(u8::from).collect();

        let mut circuit = FreeXorCircuit::new(plain).unwrap();
        let keys = circuit.garble().unwrap();
        prop_assert!(circuit.verify(&keys.all_input_keys));

        let as_bytes = |bits: &[bool]| bits.iter().map(|b| u8::from(*b)).collect::<Vec<_>>();
        let mut input = circuit
            .garbled_input_from_ungarbled_input(&as_bytes(&a), &keys.all_input_keys, 1)
            .unwrap();
        input.extend(
            circuit
                .garbled_input_from_ungarbled_input(&as_bytes(&b), &keys.all_input_keys, 2)
                .unwrap(),
        );
        let output = circuit.compute(&input).unwrap();
        prop_assert_eq!(expected, circuit.verified_translate(&output, &keys.all_output_keys).unwrap());
    }
}

#[test]
fn evaluator_with_received_tables() -> Result<(), Error> {
    let circuit = BooleanCircuit {
        input_gates: vec![2],
        gates: vec![Gate::Or(0, 1), Gate::Not(2)],
        output_gates: vec![2, 3],
    };
    let mut garbler = FreeXorCircuit::new(circuit.clone())?;
    let keys = garbler.garble_with_seed(&[4; 16])?;

    let mut evaluator = FreeXorCircuit::new(circuit)?;
    evaluator.set_garbled_tables(garbler.garbled_tables())?;
    evaluator.set_translation_table(garbler.translation_table().to_vec());
    for (x, y) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        let input = evaluator.garbled_input_from_ungarbled_input(&[x, y], &keys.all_input_keys, 1)?;
        let output = evaluator.compute(&input)?;
        let or = x | y;
        assert_eq!(vec![or, 1 - or], evaluator.translate(&output)?);
    }
    Ok(())
}

#[test]
fn invalid_circuit_is_rejected() {
    let circuit = BooleanCircuit {
        input_gates: vec![1],
        gates: vec![Gate::And(0, 1)],
        output_gates: vec![1],
    };
    assert!(matches!(
        FreeXorCircuit::new(circuit),
        Err(Error::Circuit(_))
    ));
}
