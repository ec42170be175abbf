//! Exercise catalog - static exercise base grouped by muscle

use serde::{Deserialize, Serialize};

/// Muscle groups used to tag and filter the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Chest,      // Peito
    Back,       // Costas
    Biceps,     // Bíceps
    Triceps,    // Tríceps
    Quads,      // Quadríceps
    Hamstrings, // Posterior de coxa
    Calves,     // Panturrilha
    Forearms,   // Antebraço
    Glutes,     // Glúteo
    Cardio,
}

impl MuscleGroup {
    /// Label shown to users and stored inside workouts
    pub fn label(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Peito",
            MuscleGroup::Back => "Costas",
            MuscleGroup::Biceps => "Bíceps",
            MuscleGroup::Triceps => "Tríceps",
            MuscleGroup::Quads => "Quadríceps",
            MuscleGroup::Hamstrings => "Posterior de Coxa",
            MuscleGroup::Calves => "Panturrilha",
            MuscleGroup::Forearms => "Antebraço",
            MuscleGroup::Glutes => "Glúteo",
            MuscleGroup::Cardio => "Cardio",
        }
    }

    /// All muscle groups in catalog order
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Quads,
            MuscleGroup::Hamstrings,
            MuscleGroup::Calves,
            MuscleGroup::Forearms,
            MuscleGroup::Glutes,
            MuscleGroup::Cardio,
        ]
    }

    /// Case-insensitive lookup by label
    pub fn from_label(label: &str) -> Option<MuscleGroup> {
        let label = label.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|m| m.label().to_lowercase() == label)
    }
}

#[derive(Debug, Clone)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    pub muscle: MuscleGroup,
    pub instructions: &'static str,
}

/// Id prefix shared by all cardio entries
pub const CARDIO_PREFIX: &str = "cardio";

pub const CATALOG: &[Exercise] = &[
    // Peito
    Exercise {
        id: "p1",
        name: "Supino Reto com Barra",
        muscle: MuscleGroup::Chest,
        instructions: "Deite no banco, segure a barra com pegada média e desça até o peito, empurrando de volta.",
    },
    Exercise {
        id: "p2",
        name: "Supino Reto com Halteres",
        muscle: MuscleGroup::Chest,
        instructions: "Deitado, empurre os halteres para cima mantendo a estabilidade dos ombros.",
    },
    Exercise {
        id: "p3",
        name: "Supino Inclinado com Barra",
        muscle: MuscleGroup::Chest,
        instructions: "Foco na porção superior. Desça a barra até a parte alta do peito.",
    },
    Exercise {
        id: "p4",
        name: "Supino Inclinado com Halteres",
        muscle: MuscleGroup::Chest,
        instructions: "Foco na porção superior com maior amplitude de movimento.",
    },
    Exercise {
        id: "p5",
        name: "Supino Declinado com Barra",
        muscle: MuscleGroup::Chest,
        instructions: "Foco na porção inferior do peitoral.",
    },
    Exercise {
        id: "p6",
        name: "Supino Declinado com Halteres",
        muscle: MuscleGroup::Chest,
        instructions: "Foco na porção inferior com halteres.",
    },
    Exercise {
        id: "p7",
        name: "Chest Press (Máquina)",
        muscle: MuscleGroup::Chest,
        instructions: "Empurre as manoplas à frente, mantendo as costas apoiadas.",
    },
    Exercise {
        id: "p8",
        name: "Paralelas (Ênfase em Peito)",
        muscle: MuscleGroup::Chest,
        instructions: "Incline o tronco à frente para focar no peitoral inferior.",
    },
    Exercise {
        id: "p9",
        name: "Crucifixo Reto com Halteres",
        muscle: MuscleGroup::Chest,
        instructions: "Abra os braços lateralmente com cotovelos levemente flexionados.",
    },
    Exercise {
        id: "p10",
        name: "Crucifixo Inclinado com Halteres",
        muscle: MuscleGroup::Chest,
        instructions: "Abertura lateral focando na porção superior do peito.",
    },
    Exercise {
        id: "p11",
        name: "Crucifixo Declinado com Halteres",
        muscle: MuscleGroup::Chest,
        instructions: "Abertura lateral focando na porção inferior.",
    },
    Exercise {
        id: "p12",
        name: "Crucifixo na Máquina (Peck Deck)",
        muscle: MuscleGroup::Chest,
        instructions: "Junte os braços à frente mantendo a contração constante.",
    },
    Exercise {
        id: "p13",
        name: "Crucifixo Polia Alta (Foco Inferior)",
        muscle: MuscleGroup::Chest,
        instructions: "Puxe de cima para baixo cruzando as mãos à frente do quadril.",
    },
    Exercise {
        id: "p14",
        name: "Crucifixo Polia Média (Geral)",
        muscle: MuscleGroup::Chest,
        instructions: "Puxe do centro para a frente do peito.",
    },
    Exercise {
        id: "p15",
        name: "Crucifixo Polia Baixa (Foco Superior)",
        muscle: MuscleGroup::Chest,
        instructions: "Puxe de baixo para cima cruzando à frente do rosto.",
    },
    Exercise {
        id: "p16",
        name: "Cross Over",
        muscle: MuscleGroup::Chest,
        instructions: "Movimento de adução de braços com cabos.",
    },
    // Costas
    Exercise {
        id: "c1",
        name: "Barra Fixa (Pronada)",
        muscle: MuscleGroup::Back,
        instructions: "Puxe o corpo para cima até o queixo ultrapassar a barra.",
    },
    Exercise {
        id: "c2",
        name: "Puxada na Frente (Aberta)",
        muscle: MuscleGroup::Back,
        instructions: "Puxe a barra em direção ao peito focando na largura das costas.",
    },
    Exercise {
        id: "c3",
        name: "Puxada Atrás da Nuca",
        muscle: MuscleGroup::Back,
        instructions: "Puxe a barra por trás da cabeça (requer boa mobilidade).",
    },
    Exercise {
        id: "c4",
        name: "Remada Curvada com Barra",
        muscle: MuscleGroup::Back,
        instructions: "Tronco inclinado, puxe a barra em direção ao abdômen.",
    },
    Exercise {
        id: "c5",
        name: "Remada Cavalinho (T-Bar)",
        muscle: MuscleGroup::Back,
        instructions: "Puxe a barra entre as pernas com as mãos em pegada neutra.",
    },
    Exercise {
        id: "c6",
        name: "Remada Baixa na Polia",
        muscle: MuscleGroup::Back,
        instructions: "Sentado, puxe o triângulo em direção à cintura.",
    },
    Exercise {
        id: "c7",
        name: "Pulldown Unilateral",
        muscle: MuscleGroup::Back,
        instructions: "Foco no isolamento de cada lado da grande dorsal.",
    },
    Exercise {
        id: "c11",
        name: "Pulldown Tradicional na Polia",
        muscle: MuscleGroup::Back,
        instructions: "De pé frente à polia alta, braços estendidos, puxe a barra em direção às coxas mantendo os braços retos para isolar a grande dorsal.",
    },
    Exercise {
        id: "c8",
        name: "Pullover com Halteres",
        muscle: MuscleGroup::Back,
        instructions: "Deitado, leve o halter para trás da cabeça e puxe de volta.",
    },
    Exercise {
        id: "c9",
        name: "Levantamento Terra",
        muscle: MuscleGroup::Back,
        instructions: "Exercício composto que trabalha toda a cadeia posterior.",
    },
    Exercise {
        id: "c10",
        name: "Encolhimento para Trapézio",
        muscle: MuscleGroup::Back,
        instructions: "Eleve os ombros em direção às orelhas.",
    },
    // Bíceps
    Exercise {
        id: "b1",
        name: "Rosca Direta com Barra",
        muscle: MuscleGroup::Biceps,
        instructions: "Flexão de cotovelos com pegada supinada.",
    },
    Exercise {
        id: "b2",
        name: "Rosca Alternada com Halteres",
        muscle: MuscleGroup::Biceps,
        instructions: "Trabalho individual de cada braço com rotação de punho.",
    },
    Exercise {
        id: "b3",
        name: "Rosca Martelo",
        muscle: MuscleGroup::Biceps,
        instructions: "Pegada neutra para focar no braquial e braquiorradial.",
    },
    Exercise {
        id: "b4",
        name: "Rosca Scott (Máquina/Barra)",
        muscle: MuscleGroup::Biceps,
        instructions: "Apoie os braços no banco Scott para isolamento total.",
    },
    Exercise {
        id: "b5",
        name: "Rosca Concentrada",
        muscle: MuscleGroup::Biceps,
        instructions: "Sentado, apoie o cotovelo na coxa e flexione.",
    },
    Exercise {
        id: "b6",
        name: "Rosca 21",
        muscle: MuscleGroup::Biceps,
        instructions: "7 reps curtas baixo, 7 curtas cima, 7 completas.",
    },
    // Tríceps
    Exercise {
        id: "t1",
        name: "Tríceps Testa com Barra",
        muscle: MuscleGroup::Triceps,
        instructions: "Deitado, leve a barra em direção à testa e estenda.",
    },
    Exercise {
        id: "t2",
        name: "Tríceps Francês",
        muscle: MuscleGroup::Triceps,
        instructions: "Segure o peso atrás da cabeça e estenda verticalmente.",
    },
    Exercise {
        id: "t3",
        name: "Tríceps Corda na Polia",
        muscle: MuscleGroup::Triceps,
        instructions: "Estenda os braços para baixo abrindo a corda no final.",
    },
    Exercise {
        id: "t4",
        name: "Tríceps Coice",
        muscle: MuscleGroup::Triceps,
        instructions: "Tronco inclinado, estenda o braço para trás.",
    },
    Exercise {
        id: "t5",
        name: "Mergulho no Banco",
        muscle: MuscleGroup::Triceps,
        instructions: "Apoie as mãos no banco atrás do corpo e desça o quadril.",
    },
    // Quadríceps
    Exercise {
        id: "q1",
        name: "Agachamento Livre",
        muscle: MuscleGroup::Quads,
        instructions: "Desça o quadril mantendo a coluna reta e joelhos alinhados.",
    },
    Exercise {
        id: "q2",
        name: "Leg Press 45",
        muscle: MuscleGroup::Quads,
        instructions: "Empurre a plataforma com os pés afastados na largura dos ombros.",
    },
    Exercise {
        id: "q3",
        name: "Cadeira Extensora",
        muscle: MuscleGroup::Quads,
        instructions: "Extensão total das pernas contra a resistência.",
    },
    Exercise {
        id: "q4",
        name: "Avanço (Passada)",
        muscle: MuscleGroup::Quads,
        instructions: "Dê um passo à frente e flexione o joelho até quase tocar o chão.",
    },
    Exercise {
        id: "q5",
        name: "Sissy Squat",
        muscle: MuscleGroup::Quads,
        instructions: "Agachamento com foco extremo no isolamento do quadríceps.",
    },
    // Posterior de coxa
    Exercise {
        id: "pc1",
        name: "Mesa Flexora",
        muscle: MuscleGroup::Hamstrings,
        instructions: "Deitado, flexione as pernas em direção aos glúteos.",
    },
    Exercise {
        id: "pc2",
        name: "Cadeira Flexora",
        muscle: MuscleGroup::Hamstrings,
        instructions: "Sentado, flexione as pernas para baixo.",
    },
    Exercise {
        id: "pc3",
        name: "Stiff com Barra",
        muscle: MuscleGroup::Hamstrings,
        instructions: "Desça a barra rente às pernas com joelhos semi-flexionados.",
    },
    Exercise {
        id: "pc4",
        name: "Levantamento Terra Romeno",
        muscle: MuscleGroup::Hamstrings,
        instructions: "Foco na extensão de quadril e alongamento dos isquiotibiais.",
    },
    // Panturrilha
    Exercise {
        id: "pa1",
        name: "Panturrilha em Pé",
        muscle: MuscleGroup::Calves,
        instructions: "Eleve os calcanhares o máximo possível.",
    },
    Exercise {
        id: "pa2",
        name: "Panturrilha Sentado",
        muscle: MuscleGroup::Calves,
        instructions: "Foco no músculo sóleo.",
    },
    Exercise {
        id: "pa3",
        name: "Panturrilha no Leg Press",
        muscle: MuscleGroup::Calves,
        instructions: "Use a plataforma do leg para flexão plantar.",
    },
    // Antebraço
    Exercise {
        id: "an1",
        name: "Rosca Punho",
        muscle: MuscleGroup::Forearms,
        instructions: "Flexão dos punhos com a palma voltada para cima.",
    },
    Exercise {
        id: "an2",
        name: "Rosca Inversa",
        muscle: MuscleGroup::Forearms,
        instructions: "Rosca direta com pegada pronada.",
    },
    Exercise {
        id: "an3",
        name: "Farmer’s Walk",
        muscle: MuscleGroup::Forearms,
        instructions: "Caminhe segurando pesos pesados para força de preensão.",
    },
    // Glúteo máximo
    Exercise {
        id: "gm1",
        name: "Hip Thrust (Elevação Pélvica)",
        muscle: MuscleGroup::Glutes,
        instructions: "Apoie as costas no banco e eleve o quadril com peso.",
    },
    Exercise {
        id: "gm2",
        name: "Agachamento Sumô",
        muscle: MuscleGroup::Glutes,
        instructions: "Pés afastados e pontas para fora, foco em glúteo e adutores.",
    },
    Exercise {
        id: "gm3",
        name: "Coice na Polia",
        muscle: MuscleGroup::Glutes,
        instructions: "Chute para trás mantendo a perna estendida.",
    },
    Exercise {
        id: "gm4",
        name: "Afundo Búlgaro",
        muscle: MuscleGroup::Glutes,
        instructions: "Um pé elevado atrás no banco, desça com a outra perna.",
    },
    // Glúteo médio/mínimo
    Exercise {
        id: "gme1",
        name: "Abdução de Quadril na Máquina",
        muscle: MuscleGroup::Glutes,
        instructions: "Afaste as pernas contra a resistência lateral.",
    },
    Exercise {
        id: "gme2",
        name: "Abdução de Quadril na Polia",
        muscle: MuscleGroup::Glutes,
        instructions: "Em pé, afaste a perna lateralmente.",
    },
    Exercise {
        id: "gme3",
        name: "Clamshell (Ostra)",
        muscle: MuscleGroup::Glutes,
        instructions: "Deitado de lado, abra os joelhos mantendo os pés juntos.",
    },
    Exercise {
        id: "gme4",
        name: "Monster Walk com Elástico",
        muscle: MuscleGroup::Glutes,
        instructions: "Caminhada lateral com resistência de mini-band.",
    },
    // Cardio
    Exercise {
        id: "cardio1",
        name: "Corrida na Esteira",
        muscle: MuscleGroup::Cardio,
        instructions: "Corrida em ritmo moderado a intenso para queima calórica.",
    },
    Exercise {
        id: "cardio2",
        name: "Bicicleta Ergométrica",
        muscle: MuscleGroup::Cardio,
        instructions: "Ciclismo indoor focado em resistência cardiovascular.",
    },
    Exercise {
        id: "cardio3",
        name: "Corda (Pular Corda)",
        muscle: MuscleGroup::Cardio,
        instructions: "Pular corda para queima rápida e coordenação.",
    },
    Exercise {
        id: "cardio4",
        name: "Elíptico",
        muscle: MuscleGroup::Cardio,
        instructions: "Movimento de baixo impacto para queima de gordura e condicionamento.",
    },
];

pub fn find_exercise(id: &str) -> Option<&'static Exercise> {
    CATALOG.iter().find(|e| e.id == id)
}

pub fn is_cardio(id: &str) -> bool {
    id.starts_with(CARDIO_PREFIX)
}

/// Distinct muscle groups present in the catalog, in first-seen order
pub fn muscle_groups() -> Vec<MuscleGroup> {
    let mut groups = Vec::new();
    for exercise in CATALOG {
        if !groups.contains(&exercise.muscle) {
            groups.push(exercise.muscle);
        }
    }
    groups
}

/// Catalog browser filter.
///
/// `term` matches name or muscle label, case-insensitive; `muscle` of `None`
/// means every group.
pub fn filter_exercises(term: &str, muscle: Option<MuscleGroup>) -> Vec<&'static Exercise> {
    let term = term.trim().to_lowercase();
    CATALOG
        .iter()
        .filter(|e| {
            term.is_empty()
                || e.name.to_lowercase().contains(&term)
                || e.muscle.label().to_lowercase().contains(&term)
        })
        .filter(|e| muscle.is_none_or(|m| e.muscle == m))
        .collect()
}

/// `ID: p1 | Nome: ... | Músculo: ...` lines for prompts
pub fn catalog_listing() -> String {
    CATALOG
        .iter()
        .map(|e| format!("ID: {} | Nome: {} | Músculo: {}", e.id, e.name, e.muscle.label()))
        .collect::<Vec<_>>()
        .join("\n")
}
