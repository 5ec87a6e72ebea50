#![allow(dead_code)]

use atomsel::core::models::atom::Atom;
use atomsel::core::models::builder::AtomicSystemBuilder;
use atomsel::core::models::system::AtomicSystem;
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RESIDUES: [(&str, &[&str]); 6] = [
    ("ALA", &["N", "CA", "C", "O", "CB", "H", "HA"]),
    ("LYS", &["N", "CA", "C", "O", "CB", "CG", "NZ"]),
    ("ASP", &["N", "CA", "C", "O", "CB", "OD1", "OD2"]),
    ("PHE", &["N", "CA", "C", "O", "CB", "CG", "CZ"]),
    ("HOH", &["OW", "HW1", "HW2"]),
    ("NA", &["NA"]),
];

/// Ten atoms: eight protein atoms on the x axis, two waters, with exactly
/// three protein atoms (0, 6 and 7) within 5 of a water.
pub fn ten_atom_system() -> AtomicSystem {
    let mut builder = AtomicSystemBuilder::new();
    for (i, x) in [0.0, 3.0, 6.0, 9.0, 12.0, 15.0, 18.0, 21.0].into_iter().enumerate() {
        let name = if i % 2 == 0 { "CA" } else { "CB" };
        builder.add_atom(Atom::new(name, "ALA", 1 + i as i64 / 2, "A", Point3::new(x, 0.0, 0.0)));
    }
    builder
        .add_atom(Atom::new("OW", "HOH", 100, "W", Point3::new(-4.0, 0.0, 0.0)))
        .add_atom(Atom::new("OW", "HOH", 101, "W", Point3::new(23.0, 0.0, 0.0)));
    builder.build().unwrap()
}

/// A mixed system of residues laid out at random inside a cube of side `extent`.
pub fn random_system(residues: usize, extent: f64, seed: u64) -> AtomicSystem {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = AtomicSystemBuilder::new();
    for resnum in 1..=residues as i64 {
        let (resname, names) = RESIDUES[rng.gen_range(0..RESIDUES.len())];
        let chain = if resname == "HOH" { "W" } else if resnum % 2 == 0 { "A" } else { "B" };
        let center = Point3::new(
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
        );
        for name in names {
            let position = center
                + nalgebra::Vector3::new(
                    rng.gen_range(-1.5..1.5),
                    rng.gen_range(-1.5..1.5),
                    rng.gen_range(-1.5..1.5),
                );
            let element = &name[..1];
            builder.add_atom(
                Atom::new(name, resname, resnum, chain, position)
                    .with_element(element)
                    .with_beta(rng.gen_range(0.0..100.0)),
            );
        }
    }
    builder.build().unwrap()
}

/// Atoms packed into a few tight clusters far apart from each other.
pub fn clustered_system(atoms: usize, seed: u64) -> AtomicSystem {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(40.0, 5.0, -3.0),
        Point3::new(-25.0, 30.0, 12.0),
    ];
    let mut builder = AtomicSystemBuilder::new();
    for i in 0..atoms {
        let center = centers[rng.gen_range(0..centers.len())];
        let position = center
            + nalgebra::Vector3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
            );
        builder.add_atom(Atom::new("C", "LIG", i as i64, "X", position));
    }
    builder.build().unwrap()
}

pub fn distance(system: &AtomicSystem, i: usize, j: usize) -> f64 {
    let c = system.coordinates();
    (c[i] - c[j]).norm()
}

/// A `side`³ cubic lattice with `spacing` between neighbours, ordered x, y, z
/// outermost to innermost, so atom `i * side² + j * side + k` sits at
/// `(i, j, k) * spacing`.
pub fn lattice_system(side: usize, spacing: f64) -> AtomicSystem {
    let mut builder = AtomicSystemBuilder::new();
    for i in 0..side {
        for j in 0..side {
            for k in 0..side {
                let position = Point3::new(
                    i as f64 * spacing,
                    j as f64 * spacing,
                    k as f64 * spacing,
                );
                let resnum = (i * side * side + j * side + k) as i64;
                builder.add_atom(Atom::new("C", "LIG", resnum, "X", position));
            }
        }
    }
    builder.build().unwrap()
}
