//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler l’analyse complète sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - seules les erreurs de parser attendues sont acceptées (variable étrangère, syntaxe)
//! - invariants : zéros dans le domaine, segments croissants, image exacte saine

use std::time::{Duration, Instant};

use super::analyse::{analyser, Requete, ResultatPoint};
use super::erreurs::{ErreurAnalyse, ParseError};
use super::parseur::parse;
use super::reglages::Reglages;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_rat(rng: &mut Rng) -> String {
    let a = rng.pick(7) as i64 - 3;
    let b = rng.pick(4) + 1;
    if rng.coin() {
        format!("({a}/{b})")
    } else {
        format!("({a})")
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 | 1 | 2 => "x".to_string(),
        3 => gen_rat(rng),
        4 => "pi".to_string(),
        _ => "e".to_string(),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }
    let sous = |rng: &mut Rng| gen_expr(rng, depth - 1);

    match rng.pick(14) {
        0 => gen_atom(rng),
        1 => format!("({}+{})", sous(rng), sous(rng)),
        2 => format!("({}-{})", sous(rng), sous(rng)),
        3 => format!("({}*{})", sous(rng), sous(rng)),
        4 => format!("({}/{})", sous(rng), sous(rng)),
        5 => format!("({})^{}", sous(rng), rng.pick(3) + 1),
        6 => format!("sqrt({})", sous(rng)),
        7 => format!("log({})", sous(rng)),
        8 => format!("exp({})", sous(rng)),
        9 => format!("sin({})", sous(rng)),
        10 => format!("cos({})", sous(rng)),
        11 => format!("atan({})", sous(rng)),
        12 => format!("abs({})", sous(rng)),
        _ => format!("asin({})", sous(rng)),
    }
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_analyse_complete_invariants() {
    let t0 = Instant::now();
    let max = Duration::from_secs(120);
    let r = Reglages::default()
        .avec_echantillons_image(800)
        .avec_echantillons_signes(600);

    let mut rng = Rng::new(0xC0FFEE_u64);
    let mut vus = 0usize;

    for _ in 0..60 {
        budget(t0, max);

        let texte = gen_expr(&mut rng, 3);
        let q = Requete::new(texte.clone())
            .avec_x0(0.5)
            .avec_fenetre(-4.0, 4.0)
            .avec_points(200);

        let rap = match analyser(&q, &r) {
            Ok(rap) => rap,
            Err(e) => panic!("erreur non attendue: expr={texte:?} err={e}"),
        };
        vus += 1;

        // domaine : réunion ordonnée
        let p = rap.domaine.ensemble().pieces();
        assert!(p.windows(2).all(|w| w[0].sup <= w[1].inf), "expr={texte:?}");

        // zéros dans le domaine, triés
        let xs = &rap.intersections.axe_x;
        assert!(xs.iter().all(|z| rap.domaine.contient(z.x)), "expr={texte:?}");
        assert!(xs.windows(2).all(|w| w[0].x < w[1].x), "expr={texte:?}");

        // évaluation : seulement dans le domaine
        if let Some(ResultatPoint::Evalue(ev)) = &rap.evaluation {
            assert!(rap.domaine.contient(0.5), "expr={texte:?}");
            assert!(ev.valeur.is_finite());
        }

        // maillage : segments croissants, disjoints
        let segs = rap.maillage.expect("fenêtre fournie").expect("fenêtre valide");
        let tous: Vec<f64> = segs.iter().flat_map(|s| s.points.iter().map(|p| p.0)).collect();
        assert!(tous.windows(2).all(|w| w[0] < w[1]), "expr={texte:?}");
        assert!(segs
            .iter()
            .flat_map(|s| &s.points)
            .all(|p| p.1.is_finite()));
    }

    assert!(vus > 10, "trop peu d’analyses: {vus}");
}

#[test]
fn fuzz_safe_determinisme() {
    let t0 = Instant::now();
    let max = Duration::from_secs(60);
    let r = Reglages::default();

    // Même seed => mêmes expressions => mêmes rapports
    let mut a = Rng::new(0xBADC0DE_u64);
    let mut b = a.clone();
    for _ in 0..15 {
        budget(t0, max);
        let ta = gen_expr(&mut a, 2);
        let tb = gen_expr(&mut b, 2);
        assert_eq!(ta, tb);
        let ra = analyser(&Requete::new(ta.clone()), &r);
        let rb = analyser(&Requete::new(tb), &r);
        assert_eq!(ra, rb, "expr={ta:?}");
    }
}

#[test]
fn fuzz_safe_entrees_hostiles() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);
    let r = Reglages::default();

    let hostiles = [
        "",
        "   ",
        "x +",
        "((x)",
        "x)",
        "__import__('os')",
        "x.real",
        "lambda: x",
        "x + y",
        "sin()",
        "1e999999",
        "x^^2",
        "open(x)",
        "x;x",
    ];
    for h in hostiles {
        budget(t0, max);
        match analyser(&Requete::new(h), &r) {
            Err(ErreurAnalyse::Parse(_)) => {}
            autre => panic!("entrée hostile acceptée : {h:?} -> {autre:?}"),
        }
    }

    // imbrication ou exposants démesurés : refus ou réponse rapide
    let profond = format!("{}x{}", "sin(".repeat(20_000), ")".repeat(20_000));
    assert!(matches!(parse(&profond), Err(ParseError::Structure(_))));
    budget(t0, max);
    assert!(parse("((9^4096)^4096)^64").is_ok());
    budget(t0, max);

    // texte long mais légitime : doit passer
    let long = vec!["x"; 200].join("+");
    assert!(parse(&long).is_ok());
    assert!(matches!(parse("x + t"), Err(ParseError::VariableNonPermise { .. })));
}
