#[cfg(test)]
mod tests {
    use crate::matrices::block_matrix::block_matrix;
    use crate::matrices::explicit_matrix::{MatrixStructure, construct_explicit_matrix};
    use crate::matrices::matrix_DE::{system_from_matrix_DE, unraveled_state, vector_DE_from_matrix_DE};
    use crate::matrices::matrix_errors::MatrixError;
    use crate::matrices::matrix_subs::{SubsSource, Substitutions, matrix_subs};
    use crate::matrices::matrix_trajectory::{
        MatrixSample, MatrixTrajectory, TimeArg, UnraveledOrder,
        matrix_callable_from_vector_trajectory,
    };
    use crate::symbolic::symbolic_engine::{Expr, Symbol, SymbolKind};
    use crate::symbolic::symbolic_vectors::ExprMatrix;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};
    use std::collections::HashMap;

    fn abc() -> (Symbol, Symbol, Symbol) {
        crate::symbols!(a, b, c)
    }

    //___________________________________SUBSTITUTIONS____________________________________

    #[test]
    fn test_subs_round_trip_skips_structural_zeros() {
        let (a, b, c) = abc();
        let symbolic = ExprMatrix::new(vec![
            vec![a.to_expr(), Expr::Const(0.0)],
            vec![b.to_expr(), c.to_expr()],
        ])
        .unwrap();
        let values = DMatrix::from_row_slice(2, 2, &[1.5, 9.0, -2.0, 4.0]);
        let value_matrix = ExprMatrix::from_dmatrix(&values);

        let subs = matrix_subs(SubsSource::Pair(&symbolic, &value_matrix)).unwrap();
        assert_eq!(subs.len(), 3);

        let evaluated = subs.apply(&symbolic).evaluate(&HashMap::new()).unwrap();
        for ((i, j), entry) in symbolic.cells() {
            if !entry.is_zero() {
                assert_relative_eq!(evaluated[(i, j)], values[(i, j)]);
            }
        }
    }

    #[test]
    fn test_subs_pairs_keep_duplicates_in_order() {
        let (a, b, _) = abc();
        let m1 = ExprMatrix::from_symbols(&[vec![a.clone(), b.clone()]]).unwrap();
        let m2 = ExprMatrix::from_symbols(&[vec![a.clone()]]).unwrap();
        let v1 = ExprMatrix::from_dmatrix(&DMatrix::from_row_slice(1, 2, &[1.0, 2.0]));
        let v2 = ExprMatrix::from_dmatrix(&DMatrix::from_row_slice(1, 1, &[3.0]));
        let pairs = vec![(m1, v1), (m2, v2)];

        let subs = matrix_subs(SubsSource::Pairs(&pairs)).unwrap();
        assert_eq!(
            subs,
            Substitutions::Pairs(vec![
                (a.clone(), Expr::Const(1.0)),
                (b.clone(), Expr::Const(2.0)),
                (a.clone(), Expr::Const(3.0)),
            ])
        );

        let map = matrix_subs(SubsSource::Mapping(&pairs)).unwrap();
        match map {
            Substitutions::Map(map) => {
                assert_eq!(map.len(), 2);
                assert_eq!(map[&a], Expr::Const(3.0));
                assert_eq!(map[&b], Expr::Const(2.0));
            }
            other => panic!("expected a map, got {:?}", other),
        }
    }

    #[test]
    fn test_subs_shape_mismatch_and_non_symbol() {
        let (a, b, _) = abc();
        let symbolic = ExprMatrix::from_symbols(&[vec![a.clone(), b.clone()]]).unwrap();
        let values = ExprMatrix::zeros(2, 1);
        assert!(matches!(
            matrix_subs(SubsSource::Pair(&symbolic, &values)),
            Err(MatrixError::DimensionMismatch { .. })
        ));

        let compound = ExprMatrix::new(vec![vec![a.to_expr() * b.to_expr()]]).unwrap();
        let values = ExprMatrix::zeros(1, 1);
        assert!(matches!(
            matrix_subs(SubsSource::Pair(&compound, &values)),
            Err(MatrixError::NotASymbol { row: 0, col: 0, .. })
        ));
    }

    #[test]
    fn test_subs_symbolic_values() {
        let a = construct_explicit_matrix("A", 2, 2, MatrixStructure::Diagonal, SymbolKind::Static)
            .unwrap();
        let (x, _, _) = abc();
        let doubled = ExprMatrix::new(vec![
            vec![Expr::Const(2.0) * x.to_expr(), Expr::Const(0.0)],
            vec![Expr::Const(0.0), x.to_expr()],
        ])
        .unwrap();
        let subs = matrix_subs(SubsSource::Pair(&a, &doubled)).unwrap();
        assert_eq!(subs.len(), 2);
        let replaced = subs.apply(&a);
        let num = replaced.evaluate(&HashMap::from([(x, 5.0)])).unwrap();
        assert_relative_eq!(num, DMatrix::from_row_slice(2, 2, &[10.0, 0.0, 0.0, 5.0]));
    }

    //___________________________________BLOCKS____________________________________

    #[test]
    fn test_block_matrix_offsets() {
        let a = construct_explicit_matrix("a", 2, 3, MatrixStructure::General, SymbolKind::Static)
            .unwrap();
        let b = construct_explicit_matrix("b", 2, 2, MatrixStructure::General, SymbolKind::Static)
            .unwrap();
        let c = construct_explicit_matrix("c", 1, 3, MatrixStructure::General, SymbolKind::Static)
            .unwrap();
        let d = construct_explicit_matrix("d", 1, 2, MatrixStructure::General, SymbolKind::Static)
            .unwrap();
        let m = block_matrix(&[vec![a.clone(), b.clone()], vec![c.clone(), d.clone()]]).unwrap();
        assert_eq!(m.shape(), (3, 5));
        for (block, (r0, c0)) in [(&a, (0, 0)), (&b, (0, 3)), (&c, (2, 0)), (&d, (2, 3))] {
            for ((i, j), e) in block.cells() {
                assert_eq!(&m[(r0 + i, c0 + j)], e);
            }
        }
    }

    #[test]
    fn test_block_matrix_with_empty_blocks() {
        let a = ExprMatrix::zeros(2, 2);
        let m = block_matrix(&[
            vec![a.clone(), ExprMatrix::zeros(2, 0)],
            vec![ExprMatrix::zeros(0, 2), ExprMatrix::zeros(0, 0)],
        ])
        .unwrap();
        assert_eq!(m.shape(), (2, 2));
    }

    #[test]
    fn test_block_matrix_mismatch() {
        let res = block_matrix(&[vec![ExprMatrix::zeros(2, 2), ExprMatrix::zeros(1, 2)]]);
        assert!(matches!(res, Err(MatrixError::DimensionMismatch { .. })));
        let res = block_matrix(&[
            vec![ExprMatrix::zeros(1, 3), ExprMatrix::zeros(1, 2)],
            vec![ExprMatrix::zeros(1, 2), ExprMatrix::zeros(1, 3)],
        ]);
        assert!(matches!(res, Err(MatrixError::DimensionMismatch { .. })));
    }

    //___________________________________TRAJECTORIES____________________________________

    fn symmetric_layout() -> (Vec<Symbol>, ExprMatrix) {
        let (a, b, c) = abc();
        let raveled =
            ExprMatrix::from_symbols(&[vec![a.clone(), b.clone()], vec![b.clone(), c.clone()]])
                .unwrap();
        (vec![a, b, c], raveled)
    }

    #[test]
    fn test_reconstruction_with_repeated_symbols() {
        let (unraveled, raveled) = symmetric_layout();
        let tt = DVector::from_vec(vec![0.0]);
        let x = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        let traj = matrix_callable_from_vector_trajectory(&tt, &x, unraveled, &raveled).unwrap();
        let m = traj.matrix_at(TimeArg::Scalar(0.0)).unwrap().single().unwrap();
        assert_relative_eq!(m, DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 3.0]));
    }

    #[test]
    fn test_reconstruction_interpolates_between_samples() {
        let (unraveled, raveled) = symmetric_layout();
        let tt = DVector::from_vec(vec![0.0, 1.0]);
        let x = DMatrix::from_row_slice(2, 3, &[0.0, 0.0, 0.0, 2.0, 4.0, 6.0]);
        let traj = matrix_callable_from_vector_trajectory(&tt, &x, unraveled, &raveled).unwrap();
        let m = traj.matrix_at(TimeArg::Scalar(0.5)).unwrap().single().unwrap();
        assert_relative_eq!(
            m,
            DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 3.0]),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_batch_shapes() {
        let (unraveled, raveled) = symmetric_layout();
        let tt = DVector::from_vec(vec![0.0, 1.0, 2.0]);
        let x = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let traj = matrix_callable_from_vector_trajectory(&tt, &x, unraveled, &raveled).unwrap();

        let times = [0.0, 1.0, 2.0, 0.5];
        let batch = traj.matrix_at(TimeArg::Batch(&times)).unwrap().batch().unwrap();
        assert_eq!(batch.shape(), &[4, 2, 2]);
        assert_relative_eq!(batch[[1, 0, 1]], 5.0);
        assert_relative_eq!(batch[[1, 1, 0]], 5.0);
        assert_relative_eq!(batch[[2, 1, 1]], 9.0);
        assert_relative_eq!(batch[[3, 0, 0]], 2.5, epsilon = 1e-12);

        // a batch of one time comes back as a single matrix
        match traj.matrix_at(TimeArg::Batch(&[1.0])).unwrap() {
            MatrixSample::Single(m) => {
                assert_relative_eq!(m, DMatrix::from_row_slice(2, 2, &[4.0, 5.0, 5.0, 6.0]))
            }
            MatrixSample::Batch(a) => panic!("expected a single matrix, got {:?}", a.shape()),
        }
        // unless stacking is asked for explicitly
        let stacked = traj.matrix_at(TimeArg::Stacked(&[1.0])).unwrap().batch().unwrap();
        assert_eq!(stacked.shape(), &[1, 2, 2]);
        assert_relative_eq!(stacked[[0, 1, 1]], 6.0);
    }

    #[test]
    fn test_missing_symbol_is_an_error() {
        let (a, b, c) = abc();
        let d = Symbol::new("d");
        let raveled = ExprMatrix::from_symbols(&[vec![a.clone(), d]]).unwrap();
        let tt = DVector::from_vec(vec![0.0]);
        let x = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        let traj = matrix_callable_from_vector_trajectory(&tt, &x, vec![a, b, c], &raveled).unwrap();
        assert!(matches!(
            traj.matrix_at(TimeArg::Scalar(0.0)),
            Err(MatrixError::SymbolNotFound { row: 0, col: 1, .. })
        ));
        assert!(traj.matrix_at(TimeArg::Batch(&[0.0, 1.0])).is_err());
        assert!(traj.column_indices().is_err());
    }

    #[test]
    fn test_static_and_dynamic_symbols_are_distinct() {
        let raveled = ExprMatrix::from_symbols(&[vec![Symbol::dynamic("a")]]).unwrap();
        let tt = DVector::from_vec(vec![0.0]);
        let x = DMatrix::from_row_slice(1, 1, &[1.0]);
        let traj =
            matrix_callable_from_vector_trajectory(&tt, &x, vec![Symbol::new("a")], &raveled).unwrap();
        assert!(matches!(
            traj.matrix_at(TimeArg::Scalar(0.0)),
            Err(MatrixError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn test_unraveled_from_matrix_and_column_mismatch() {
        let (_, raveled) = symmetric_layout();
        let order = UnraveledOrder::from_matrix(&raveled).unwrap();
        assert_eq!(order.len(), 4);
        let tt = DVector::from_vec(vec![0.0]);
        let x = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        assert!(matches!(
            matrix_callable_from_vector_trajectory(&tt, &x, order, &raveled),
            Err(MatrixError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_column_indices() {
        let (unraveled, raveled) = symmetric_layout();
        let tt = DVector::from_vec(vec![0.0]);
        let x = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        let traj = matrix_callable_from_vector_trajectory(&tt, &x, unraveled, &raveled).unwrap();
        assert_eq!(traj.column_indices().unwrap(), vec![vec![0, 1], vec![1, 2]]);
    }

    #[test]
    fn test_trajectory_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MatrixTrajectory>();
    }

    #[test]
    fn test_trajectory_shared_between_threads() {
        let (unraveled, raveled) = symmetric_layout();
        let tt = DVector::from_vec(vec![0.0, 1.0]);
        let x = DMatrix::from_row_slice(2, 3, &[0.0, 0.0, 0.0, 2.0, 4.0, 6.0]);
        let traj = matrix_callable_from_vector_trajectory(&tt, &x, unraveled, &raveled).unwrap();
        let expected = traj.matrix_at(TimeArg::Scalar(0.25)).unwrap().single().unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    s.spawn(|| {
                        (0..100)
                            .map(|_| traj.matrix_at(TimeArg::Scalar(0.25)).unwrap().single().unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                for m in handle.join().unwrap() {
                    assert_relative_eq!(m, expected);
                }
            }
        });
    }

    //___________________________________MATRIX DE____________________________________

    #[test]
    fn test_converter_maps_each_symbol_to_its_expression() {
        let x = construct_explicit_matrix("x", 2, 2, MatrixStructure::General, SymbolKind::Dynamic)
            .unwrap();
        let k = Symbol::new("k");
        let mat_DE = x.map(|e| Expr::Const(-1.0) * k.to_expr() * e.clone());
        let (vec_DE, vec_var) = vector_DE_from_matrix_DE(&mat_DE, &x).unwrap();
        assert_eq!(vec_var.len(), 4);
        for ((i, j), entry) in x.cells() {
            let idx = vec_var
                .iter()
                .position(|s| Some(s) == entry.as_symbol())
                .unwrap();
            assert_eq!(vec_DE[idx], mat_DE[(i, j)]);
        }
    }

    #[test]
    fn test_converter_order_is_row_major_first_seen() {
        let (a, b, c) = abc();
        let mat_var =
            ExprMatrix::from_symbols(&[vec![c.clone(), a.clone()], vec![a.clone(), b.clone()]])
                .unwrap();
        assert_eq!(unraveled_state(&mat_var).unwrap(), vec![c, a, b]);
    }

    #[test]
    fn test_converter_deduplicates_symmetric_state() {
        let p = construct_explicit_matrix("P", 3, 3, MatrixStructure::Symmetric, SymbolKind::Dynamic)
            .unwrap();
        let q = construct_explicit_matrix("Q", 3, 3, MatrixStructure::Symmetric, SymbolKind::Static)
            .unwrap();
        let mat_DE = ExprMatrix::new(
            (0..3)
                .map(|i| (0..3).map(|j| q[(i, j)].clone() - p[(i, j)].clone()).collect())
                .collect(),
        )
        .unwrap();
        let constants: HashMap<Symbol, f64> = q
            .symbols()
            .into_iter()
            .enumerate()
            .map(|(k, s)| (s, k as f64))
            .collect();
        let sys = system_from_matrix_DE(&mat_DE, &p, None, Some(&constants)).unwrap();
        assert_eq!(sys.dim_state, 6);
        assert_eq!(sys.state_equation.len(), 6);
        assert_eq!(sys.state, p.symbols());
    }

    #[test]
    fn test_converter_last_write_wins() {
        let (a, b, _) = abc();
        let mat_var = ExprMatrix::from_symbols(&[vec![a.clone(), a.clone()]]).unwrap();
        let mat_DE = ExprMatrix::new(vec![vec![b.to_expr(), Expr::Const(7.0)]]).unwrap();
        let (vec_DE, vec_var) = vector_DE_from_matrix_DE(&mat_DE, &mat_var).unwrap();
        assert_eq!(vec_var, vec![a]);
        assert_eq!(vec_DE.data, vec![Expr::Const(7.0)]);
    }

    #[test]
    fn test_converter_errors() {
        let (a, b, _) = abc();
        let mat_var = ExprMatrix::from_symbols(&[vec![a.clone(), b.clone()]]).unwrap();
        let mat_DE = ExprMatrix::zeros(2, 1);
        assert!(matches!(
            system_from_matrix_DE(&mat_DE, &mat_var, None, None),
            Err(MatrixError::ShapeMismatch {
                de_shape: (2, 1),
                var_shape: (1, 2)
            })
        ));
        let with_zero = ExprMatrix::new(vec![vec![a.to_expr(), Expr::Const(0.0)]]).unwrap();
        assert!(matches!(
            system_from_matrix_DE(&ExprMatrix::zeros(1, 2), &with_zero, None, None),
            Err(MatrixError::NotASymbol { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_converter_rejects_time_as_state() {
        let t = Symbol::time();
        let mat_var = ExprMatrix::from_symbols(&[vec![t.clone()]]).unwrap();
        let mat_DE = ExprMatrix::new(vec![vec![Expr::Const(2.0) * t.to_expr()]]).unwrap();
        assert!(matches!(
            system_from_matrix_DE(&mat_DE, &mat_var, None, None),
            Err(MatrixError::DuplicateArgument { .. })
        ));
    }

    #[test]
    fn test_converter_with_inputs() {
        let x = construct_explicit_matrix("x", 2, 1, MatrixStructure::General, SymbolKind::Dynamic)
            .unwrap();
        let u = construct_explicit_matrix("u", 2, 1, MatrixStructure::General, SymbolKind::Dynamic)
            .unwrap();
        let mat_DE = ExprMatrix::new(vec![
            vec![x[(1, 0)].clone() + u[(0, 0)].clone()],
            vec![u[(1, 0)].clone()],
        ])
        .unwrap();
        let sys = system_from_matrix_DE(&mat_DE, &x, Some(&u), None).unwrap();
        assert_eq!(sys.dim_input, 2);
        let dx = sys
            .state_equation_function(
                0.0,
                &DVector::from_vec(vec![1.0, 2.0]),
                &DVector::from_vec(vec![10.0, 20.0]),
            )
            .unwrap();
        assert_relative_eq!(dx, DVector::from_vec(vec![12.0, 20.0]));
    }

    //___________________________________END TO END____________________________________

    /// Matrix DE -> vector system -> explicit Euler samples -> matrix trajectory.
    #[test]
    fn test_lyapunov_like_round_trip() {
        let p = construct_explicit_matrix("P", 2, 2, MatrixStructure::Symmetric, SymbolKind::Dynamic)
            .unwrap();
        // dP/dt = -P, so P(t) = P(0) exp(-t)
        let mat_DE = p.map(|e| -e.clone());
        let sys = system_from_matrix_DE(&mat_DE, &p, None, None).unwrap();
        let rhs = sys.rhs_closure(DVector::zeros(0)).unwrap();

        let p0 = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let mut y = DVector::from_iterator(
            sys.dim_state,
            sys.state.iter().map(|s| {
                let (i, j) = p
                    .cells()
                    .find(|(_, e)| e.as_symbol() == Some(s))
                    .map(|(ij, _)| ij)
                    .unwrap();
                p0[(i, j)]
            }),
        );
        let h = 1e-4;
        let n_steps = 10_000;
        let mut tt = Vec::with_capacity(n_steps + 1);
        let mut samples = Vec::with_capacity((n_steps + 1) * sys.dim_state);
        for k in 0..=n_steps {
            let t = k as f64 * h;
            tt.push(t);
            samples.extend(y.iter());
            let dy = rhs(t, &y);
            y += dy * h;
        }
        let tt = DVector::from_vec(tt);
        let x = DMatrix::from_row_slice(n_steps + 1, sys.dim_state, &samples);

        let traj = matrix_callable_from_vector_trajectory(&tt, &x, sys.state.clone(), &p).unwrap();
        let p1 = traj.matrix_at(TimeArg::Scalar(1.0)).unwrap().single().unwrap();
        assert_relative_eq!(p1, &p0 * (-1.0_f64).exp(), epsilon = 1e-3);
        assert_relative_eq!(p1[(0, 1)], p1[(1, 0)]);
    }
}
